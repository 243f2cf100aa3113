//! Puzzle files and the human-readable problem statement

use super::{PuzzleConfig, Relationship, Species};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Load a puzzle from a JSON file in the boundary wire shape
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<PuzzleConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;

    PuzzleConfig::from_json(&content)
        .with_context(|| format!("Failed to parse puzzle file: {}", path.as_ref().display()))
}

/// Write a puzzle as pretty-printed JSON
pub fn save_config_to_file<P: AsRef<Path>>(config: &PuzzleConfig, path: P) -> Result<()> {
    let content = config.to_json().context("Failed to serialize puzzle")?;

    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write puzzle file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Load a puzzle from JSON (`.json`) or from a problem statement (any other extension)
pub fn load_puzzle<P: AsRef<Path>>(path: P) -> Result<PuzzleConfig> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return load_config_from_file(path);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read problem statement: {}", path.display()))?;
    parse_statement(&content)
        .with_context(|| format!("Failed to parse problem statement: {}", path.display()))
}

/// Render the puzzle as the statement a solver (human or otherwise) reads
pub fn describe(config: &PuzzleConfig) -> String {
    let mut text = format!(
        "A shuttle with capacity {} must transport a group of species from the start to the target bank.\n",
        config.capacity
    );

    for species in &config.species {
        text.push_str(&format!("  - {}: {} individual(s)\n", species.name, species.count));
    }

    for rel in &config.relationships {
        text.push_str(&format!(
            "* on either bank, if {} are present, they must not be outnumbered by {}.\n",
            rel.prey, rel.predator
        ));
    }

    text.push_str(
        "Provide the solution as one line per trip, e.g. \
         \"2 name1, 1 name2 cross left -> right\" or \"1 name1 cross right -> left\".\n",
    );
    text
}

fn capacity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bcapacity\s+(\d+)").expect("capacity regex must compile"))
}

fn species_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-\s*([A-Za-z_][A-Za-z0-9_]*):\s*(\d+)\s*individual")
            .expect("species regex must compile")
    })
}

fn relationship_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bif\s+([A-Za-z_][A-Za-z0-9_]*)\s+are\s+present\b.*\boutnumbered\s+by\s+([A-Za-z_][A-Za-z0-9_]*)")
            .expect("relationship regex must compile")
    })
}

/// Read a problem statement back into a puzzle; the inverse of [`describe`].
///
/// Recognises the capacity line, `- name: N individual(s)` lines and
/// `* ... if <prey> are present ... outnumbered by <predator>.` lines.
/// Other lines are ignored.
pub fn parse_statement(text: &str) -> Result<PuzzleConfig> {
    let mut capacity: Option<u32> = None;
    let mut species = Vec::new();
    let mut relationships = Vec::new();

    for (number, line) in text.lines().map(str::trim).enumerate() {
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = species_re().captures(line) {
            let count: u32 = caps[2]
                .parse()
                .with_context(|| format!("line {}: species count out of range", number + 1))?;
            species.push(Species::new(&caps[1], count));
            continue;
        }

        if line.starts_with('*') || line.to_ascii_lowercase().contains("must not be outnumbered") {
            if line.to_ascii_lowercase().contains("collectively") {
                anyhow::bail!("line {}: group constraints are not supported", number + 1);
            }
            let caps = relationship_re()
                .captures(line)
                .with_context(|| format!("line {}: unrecognised constraint `{}`", number + 1, line))?;
            relationships.push(Relationship::new(&caps[2], &caps[1]));
            continue;
        }

        if capacity.is_none() {
            if let Some(caps) = capacity_re().captures(line) {
                capacity = Some(
                    caps[1]
                        .parse()
                        .with_context(|| format!("line {}: capacity out of range", number + 1))?,
                );
            }
        }
    }

    let capacity = capacity.context("statement does not give a shuttle capacity")?;
    if species.is_empty() {
        anyhow::bail!("statement lists no species");
    }

    debug!(
        species = species.len(),
        relationships = relationships.len(),
        capacity,
        "parsed problem statement"
    );
    Ok(PuzzleConfig::new(species, relationships, capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Relationship, Species};
    use tempfile::tempdir;

    fn sample() -> PuzzleConfig {
        PuzzleConfig::new(
            vec![Species::new("cats", 2), Species::new("dogs", 1)],
            vec![Relationship::new("dogs", "cats")],
            3,
        )
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("puzzles/sample.json");

        save_config_to_file(&sample(), &path).unwrap();
        let loaded = load_config_from_file(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_missing_file_has_context() {
        let dir = tempdir().unwrap();
        let err = load_config_from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read puzzle file"));
    }

    #[test]
    fn test_describe() {
        let text = describe(&sample());
        assert!(text.starts_with("A shuttle with capacity 3"));
        assert!(text.contains("  - cats: 2 individual(s)\n"));
        assert!(text.contains("  - dogs: 1 individual(s)\n"));
        assert!(text.contains("if cats are present, they must not be outnumbered by dogs."));
    }

    #[test]
    fn test_statement_round_trip() {
        let config = PuzzleConfig::new(
            vec![Species::new("goats", 3), Species::new("wolves", 2), Species::new("cabbage_2", 1)],
            vec![Relationship::new("wolves", "goats"), Relationship::new("goats", "cabbage_2")],
            2,
        );
        assert_eq!(parse_statement(&describe(&config)).unwrap(), config);
    }

    #[test]
    fn test_parse_statement_tolerates_layout() {
        let text = "\n\
            Transport everyone across. The shuttle has capacity 4.\n\
            - vwpmy: 2 individual(s)\n\
            -uiatu: 1 individual\n\
            * On either bank, if vwpmy are present, they must not be outnumbered by uiatu.\n";
        let config = parse_statement(text).unwrap();
        assert_eq!(config.capacity, 4);
        assert_eq!(config.species, vec![Species::new("vwpmy", 2), Species::new("uiatu", 1)]);
        assert_eq!(config.relationships, vec![Relationship::new("uiatu", "vwpmy")]);
    }

    #[test]
    fn test_parse_statement_errors() {
        let err = parse_statement("  - cats: 2 individual(s)\n").unwrap_err();
        assert!(err.to_string().contains("capacity"));

        assert!(parse_statement("A shuttle with capacity 2.\n").is_err());

        let group = "capacity 2\n- a: 1 individual(s)\n- b: 1 individual(s)\n\
            * if any of a and b are present, they must not be collectively outnumbered by c.\n";
        assert!(parse_statement(group).is_err());
    }

    #[test]
    fn test_load_puzzle_by_extension() {
        let dir = tempdir().unwrap();
        let json = dir.path().join("sample.json");
        let statement = dir.path().join("sample.txt");
        save_config_to_file(&sample(), &json).unwrap();
        std::fs::write(&statement, describe(&sample())).unwrap();

        assert_eq!(load_puzzle(&json).unwrap(), sample());
        assert_eq!(load_puzzle(&statement).unwrap(), sample());
    }
}
