//! Human-readable step lines: `2 cats, 1 dogs cross left -> right`

use super::{Direction, Solution, SolutionStep, Step};
use crate::error::DecodeError;
use itertools::Itertools;

const CROSS: &str = " cross ";
const TO_TARGET: &str = "left -> right";
const TO_START: &str = "right -> left";

/// Translates between internal steps and step lines for one species table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionCodec {
    species: Vec<String>,
}

impl SolutionCodec {
    pub fn new(species: Vec<String>) -> Self {
        Self { species }
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    /// Zero amounts are omitted; the direction comes from the states on either side
    pub fn encode_step(&self, step: &SolutionStep) -> String {
        let amounts = step
            .mv
            .amounts
            .iter()
            .zip(&self.species)
            .filter(|(&n, _)| n > 0)
            .map(|(n, name)| format!("{} {}", n, name))
            .join(", ");
        format!(
            "{}{}{} -> {}",
            amounts,
            CROSS,
            step.before.side.bank_text(),
            step.after.side.bank_text()
        )
    }

    pub fn encode(&self, solution: &Solution) -> Vec<String> {
        solution.steps.iter().map(|s| self.encode_step(s)).collect()
    }

    /// Parse one line; repeated species accumulate
    pub fn decode_line(&self, line: &str) -> Result<Step, DecodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DecodeError::Empty);
        }

        let (amounts_text, direction_text) = line
            .rsplit_once(CROSS)
            .ok_or_else(|| DecodeError::MissingCross(line.to_string()))?;

        let direction = match direction_text.trim() {
            TO_TARGET => Direction::ToTarget,
            TO_START => Direction::ToStart,
            other => return Err(DecodeError::InvalidDirection(other.to_string())),
        };

        let mut amounts = vec![0u32; self.species.len()];
        for segment in amounts_text.split(',') {
            let segment = segment.trim();
            let (count, name) = segment
                .split_once(' ')
                .ok_or_else(|| DecodeError::MalformedSegment(segment.to_string()))?;

            if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DecodeError::MalformedSegment(segment.to_string()));
            }
            let count: u32 = count
                .parse()
                .map_err(|_| DecodeError::MalformedSegment(segment.to_string()))?;

            let idx = self
                .species
                .iter()
                .position(|s| s == name)
                .ok_or_else(|| DecodeError::UnknownSpecies(name.to_string()))?;

            amounts[idx] = amounts[idx]
                .checked_add(count)
                .ok_or_else(|| DecodeError::MalformedSegment(segment.to_string()))?;
        }

        Ok(Step::new(amounts, direction))
    }

    /// Decode a whole candidate; blank lines and step labels are skipped
    pub fn decode_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<Step>, DecodeError> {
        lines
            .iter()
            .filter_map(|line| normalize_line(line.as_ref()))
            .map(|line| self.decode_line(line))
            .collect()
    }

    /// Decode free text with one step per line
    pub fn decode_text(&self, text: &str) -> Result<Vec<Step>, DecodeError> {
        let lines: Vec<&str> = text.lines().collect();
        self.decode_lines(&lines)
    }
}

/// Strips a leading `Step N:` label and a leading `move ` word; `None` for blank lines
pub fn normalize_line(line: &str) -> Option<&str> {
    let mut line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = strip_prefix_ignore_case(line, "step ") {
        if let Some((label, body)) = rest.split_once(':') {
            if !label.is_empty() && label.trim().bytes().all(|b| b.is_ascii_digit()) {
                line = body.trim();
            }
        }
    }
    if let Some(rest) = strip_prefix_ignore_case(line, "move ") {
        line = rest.trim_start();
    }

    (!line.is_empty()).then_some(line)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Move, Side, State};
    use proptest::prelude::*;

    fn codec() -> SolutionCodec {
        SolutionCodec::new(vec!["cats".to_string(), "dogs".to_string()])
    }

    #[test]
    fn test_encode_omits_zero_amounts() {
        let step = SolutionStep {
            mv: Move::new(vec![0, 1]),
            before: State { counts: vec![2, 0], side: Side::Target },
            after: State { counts: vec![2, 1], side: Side::Start },
        };
        assert_eq!(codec().encode_step(&step), "1 dogs cross right -> left");
    }

    #[test]
    fn test_encode_joins_species() {
        let step = SolutionStep {
            mv: Move::new(vec![2, 1]),
            before: State::initial(&[2, 1]),
            after: State::terminal(2),
        };
        assert_eq!(codec().encode_step(&step), "2 cats, 1 dogs cross left -> right");
    }

    #[test]
    fn test_decode_line() {
        let step = codec().decode_line("2 cats, 1 dogs cross left -> right").unwrap();
        assert_eq!(step, Step::new(vec![2, 1], Direction::ToTarget));

        let step = codec().decode_line("1 dogs cross right -> left").unwrap();
        assert_eq!(step.direction, Direction::ToStart);
    }

    #[test]
    fn test_decode_rejects_bad_direction() {
        assert_eq!(
            codec().decode_line("2 cats cross up -> down"),
            Err(DecodeError::InvalidDirection("up -> down".to_string()))
        );
    }

    #[test]
    fn test_decode_errors() {
        let codec = codec();
        assert_eq!(codec.decode_line("  "), Err(DecodeError::Empty));
        assert!(matches!(
            codec.decode_line("2 cats go left -> right"),
            Err(DecodeError::MissingCross(_))
        ));
        assert_eq!(
            codec.decode_line("2 birds cross left -> right"),
            Err(DecodeError::UnknownSpecies("birds".to_string()))
        );
        assert!(matches!(
            codec.decode_line("two cats cross left -> right"),
            Err(DecodeError::MalformedSegment(_))
        ));
        assert!(matches!(
            codec.decode_line("-1 cats cross left -> right"),
            Err(DecodeError::MalformedSegment(_))
        ));
        assert!(matches!(
            codec.decode_line("cats cross left -> right"),
            Err(DecodeError::MalformedSegment(_))
        ));
    }

    #[test]
    fn test_species_named_like_the_separator() {
        let codec = SolutionCodec::new(vec!["cross".to_string()]);
        let step = codec.decode_line("2 cross cross left -> right").unwrap();
        assert_eq!(step.amounts, vec![2]);
    }

    #[test]
    fn test_repeated_species_accumulate() {
        let step = codec().decode_line("1 cats, 1 cats cross left -> right").unwrap();
        assert_eq!(step.amounts, vec![2, 0]);
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("Step 3: 1 cats cross left -> right"), Some("1 cats cross left -> right"));
        assert_eq!(normalize_line("move 1 cats cross left -> right"), Some("1 cats cross left -> right"));
        assert_eq!(normalize_line("   "), None);
        assert_eq!(normalize_line("1 cats cross left -> right"), Some("1 cats cross left -> right"));
    }

    #[test]
    fn test_decode_lines_skips_blanks() {
        let lines = ["Step 1: 2 cats cross left -> right", "", "Step 2: 1 cats cross right -> left"];
        let steps = codec().decode_lines(&lines).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1], Step::new(vec![1, 0], Direction::ToStart));
    }

    proptest! {
        #[test]
        fn prop_encoded_lines_decode_to_same_step(cats in 0u32..20, dogs in 0u32..20, to_target in any::<bool>()) {
            prop_assume!(cats + dogs > 0);
            let (before, after) = if to_target {
                (Side::Start, Side::Target)
            } else {
                (Side::Target, Side::Start)
            };
            let step = SolutionStep {
                mv: Move::new(vec![cats, dogs]),
                before: State { counts: vec![20, 20], side: before },
                after: State { counts: vec![20, 20], side: after },
            };

            let codec = codec();
            let decoded = codec.decode_line(&codec.encode_step(&step)).unwrap();
            prop_assert_eq!(decoded.amounts, vec![cats, dogs]);
            prop_assert_eq!(decoded.direction, step.direction());
        }
    }
}
