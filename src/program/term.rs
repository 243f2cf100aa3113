//! Minimal reader for the clause syntax the compiler emits

use std::fmt;

/// A first-order term: integers, atoms, variables, compounds and lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Int(i64),
    Atom(String),
    Var(String),
    Compound(String, Vec<Term>),
    List(Vec<Term>, Option<Box<Term>>),
}

impl Term {
    /// Predicate indicator of a clause head
    pub fn functor(&self) -> Option<(&str, usize)> {
        match self {
            Term::Atom(name) => Some((name, 0)),
            Term::Compound(name, args) => Some((name, args.len())),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Term] {
        match self {
            Term::Compound(_, args) => args,
            _ => &[],
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// Elements of a proper list of integers
    pub fn as_int_list(&self) -> Option<Vec<i64>> {
        match self {
            Term::List(items, None) => items.iter().map(Term::as_int).collect(),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Int(v) => write!(f, "{}", v),
            Term::Atom(a) | Term::Var(a) => write!(f, "{}", a),
            Term::Compound(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Term::List(items, tail) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                if let Some(tail) = tail {
                    write!(f, "|{}", tail)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A clause split into head text and top-level body goals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClause {
    pub head: String,
    pub body: Vec<String>,
}

/// Split program text into clauses: comments stripped, terminated by `.`
pub fn split_clauses(text: &str) -> Result<Vec<RawClause>, String> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for line in text.lines() {
        let code = match line.find('%') {
            Some(idx) => &line[..idx],
            None => line,
        };

        let chars: Vec<char> = code.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            match c {
                '(' | '[' => depth += 1,
                ')' | ']' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(format!("unbalanced `{}` in `{}`", c, current.trim()));
                    }
                }
                '.' if depth == 0 && chars.get(i + 1).map_or(true, |n| n.is_whitespace()) => {
                    clauses.push(split_clause(current.trim())?);
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(c);
        }
        current.push('\n');
    }

    if !current.trim().is_empty() {
        return Err(format!("unterminated clause `{}`", current.trim()));
    }
    Ok(clauses)
}

fn split_clause(text: &str) -> Result<RawClause, String> {
    if text.is_empty() {
        return Err("empty clause".to_string());
    }
    match text.find(":-") {
        Some(idx) => {
            let head = text[..idx].trim().to_string();
            let body = split_top_level(&text[idx + 2..], ',')
                .into_iter()
                .map(|g| g.trim().to_string())
                .collect::<Vec<_>>();
            if body.iter().any(String::is_empty) {
                return Err(format!("empty goal in `{}`", text));
            }
            Ok(RawClause { head, body })
        }
        None => Ok(RawClause {
            head: text.to_string(),
            body: Vec::new(),
        }),
    }
}

fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse one complete term
pub fn parse_term(text: &str) -> Result<Term, String> {
    let mut parser = TermParser {
        chars: text.chars().collect(),
        pos: 0,
    };
    let term = parser.term()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return Err(format!("unexpected trailing input in `{}`", text));
    }
    Ok(term)
}

struct TermParser {
    chars: Vec<char>,
    pos: usize,
}

impl TermParser {
    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, want: char) -> Result<(), String> {
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(format!("expected `{}`, found `{}`", want, c)),
            None => Err(format!("expected `{}`, found end of input", want)),
        }
    }

    fn term(&mut self) -> Result<Term, String> {
        match self.peek() {
            Some('[') => self.list(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.int(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.word();
                let first = name.chars().next().unwrap_or('_');
                if first.is_ascii_uppercase() || first == '_' {
                    return Ok(Term::Var(name));
                }
                // compound only when `(` follows the name directly
                if self.chars.get(self.pos) == Some(&'(') {
                    self.pos += 1;
                    let args = self.arguments(')')?;
                    Ok(Term::Compound(name, args))
                } else {
                    Ok(Term::Atom(name))
                }
            }
            Some(c) => Err(format!("unexpected `{}`", c)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn int(&mut self) -> Result<Term, String> {
        let start = self.pos;
        if self.chars.get(self.pos) == Some(&'-') {
            self.pos += 1;
        }
        while self.chars.get(self.pos).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map(Term::Int)
            .map_err(|_| format!("invalid integer `{}`", digits))
    }

    fn arguments(&mut self, close: char) -> Result<Vec<Term>, String> {
        let mut args = vec![self.term()?];
        loop {
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    args.push(self.term()?);
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(args);
                }
                Some(c) => return Err(format!("unexpected `{}` in argument list", c)),
                None => return Err("unterminated argument list".to_string()),
            }
        }
    }

    fn list(&mut self) -> Result<Term, String> {
        self.expect('[')?;
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Term::List(Vec::new(), None));
        }

        let mut items = vec![self.term()?];
        loop {
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    items.push(self.term()?);
                }
                Some('|') => {
                    self.pos += 1;
                    let tail = self.term()?;
                    self.expect(']')?;
                    return Ok(Term::List(items, Some(Box::new(tail))));
                }
                Some(']') => {
                    self.pos += 1;
                    return Ok(Term::List(items, None));
                }
                Some(c) => return Err(format!("unexpected `{}` in list", c)),
                None => return Err("unterminated list".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_terms() {
        let term = parse_term("initial_state(state([2,1], start))").unwrap();
        assert_eq!(term.functor(), Some(("initial_state", 1)));
        let state = &term.args()[0];
        assert_eq!(state.args()[0].as_int_list(), Some(vec![2, 1]));
        assert_eq!(state.args()[1].as_atom(), Some("start"));
    }

    #[test]
    fn test_parse_list_tail_and_vars() {
        let term = parse_term("path(State, Visited, [step(Move, State, Next)|Rest])").unwrap();
        assert_eq!(term.functor(), Some(("path", 3)));
        assert!(matches!(term.args()[2], Term::List(_, Some(_))));
        assert_eq!(term.args()[0], Term::Var("State".to_string()));
        assert_eq!(parse_term("_").unwrap(), Term::Var("_".to_string()));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_term("move([1,2)").is_err());
        assert!(parse_term("move([1,2]) extra").is_err());
        assert!(parse_term("").is_err());
    }

    #[test]
    fn test_split_clauses() {
        let text = "% comment\nmove([0,1]).\nsafe(state(_, _)).\nbank_ok(_, 0) :- !.\nr(X) :-\n    X >= 1,\n    q([X|_]).\n";
        let clauses = split_clauses(text).unwrap();
        assert_eq!(clauses.len(), 4);
        assert_eq!(clauses[0].head, "move([0,1])");
        assert!(clauses[0].body.is_empty());
        assert_eq!(clauses[2].body, vec!["!".to_string()]);
        assert_eq!(clauses[3].body, vec!["X >= 1".to_string(), "q([X|_])".to_string()]);
    }

    #[test]
    fn test_split_reports_unterminated() {
        assert!(split_clauses("move([0,1])").is_err());
        assert!(split_clauses("move([0,1])).").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let text = "check_solution(state([2,2], start), [step([0,2], to_target)])";
        assert_eq!(parse_term(text).unwrap().to_string(), text);
    }
}
