//! Configuration settings for puzzle generation, search and output

use crate::program::{SearchLimits, DEFAULT_MAX_EXPANSIONS};
use crate::puzzle::{
    CapacityMode, ConfigGenerator, GeneratorParams, PuzzleConfig, DEFAULT_MAX_COUNT,
    DEFAULT_MIN_COUNT,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub species: usize,
    /// Individuals per species; random in `min_count..=max_count` when absent
    #[serde(default)]
    pub individuals: Option<u32>,
    #[serde(default = "default_min_count")]
    pub min_count: u32,
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    pub relationships: usize,
    /// Explicit capacity; `capacity_mode` decides when absent
    #[serde(default)]
    pub capacity: Option<u32>,
    pub capacity_mode: CapacityMode,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_min_count() -> u32 {
    DEFAULT_MIN_COUNT
}

fn default_max_count() -> u32 {
    DEFAULT_MAX_COUNT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub max_solutions: Option<usize>,
    #[serde(default)]
    pub max_steps: Option<usize>,
    pub max_expansions: u64,
    #[serde(default)]
    pub minimal_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Program,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig {
                species: 3,
                individuals: None,
                min_count: DEFAULT_MIN_COUNT,
                max_count: DEFAULT_MAX_COUNT,
                relationships: 2,
                capacity: None,
                capacity_mode: CapacityMode::Auto,
                seed: None,
            },
            solver: SolverConfig {
                max_solutions: Some(10),
                max_steps: None,
                max_expansions: DEFAULT_MAX_EXPANSIONS,
                minimal_only: false,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/puzzles"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.generator.species == 0 {
            anyhow::bail!("Number of species must be positive");
        }

        if self.generator.individuals == Some(0) {
            anyhow::bail!("Individuals per species must be positive");
        }

        if self.generator.min_count > self.generator.max_count {
            anyhow::bail!(
                "min_count ({}) must not exceed max_count ({})",
                self.generator.min_count,
                self.generator.max_count
            );
        }

        if self.generator.capacity == Some(0) {
            anyhow::bail!("Shuttle capacity must be positive");
        }

        if self.solver.max_expansions == 0 {
            anyhow::bail!("Expansion budget must be positive");
        }

        if self.solver.max_solutions == Some(0) {
            anyhow::bail!("Maximum solutions must be positive when given");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(species) = cli_overrides.species {
            self.generator.species = species;
        }
        if let Some(individuals) = cli_overrides.individuals {
            self.generator.individuals = Some(individuals);
        }
        if let Some(relationships) = cli_overrides.relationships {
            self.generator.relationships = relationships;
        }
        if let Some(capacity) = cli_overrides.capacity {
            self.generator.capacity = Some(capacity);
        }
        if let Some(seed) = cli_overrides.seed {
            self.generator.seed = Some(seed);
        }
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = Some(max_solutions);
        }
        if let Some(max_steps) = cli_overrides.max_steps {
            self.solver.max_steps = Some(max_steps);
        }
        if cli_overrides.minimal_only {
            self.solver.minimal_only = true;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
    }

    /// Search bounds for the engine
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_solutions: self.solver.max_solutions,
            max_steps: self.solver.max_steps,
            max_expansions: self.solver.max_expansions,
        }
    }
}

impl GeneratorConfig {
    /// Generate one puzzle, seeded from `seed` when set
    pub fn generate(&self) -> PuzzleConfig {
        match self.seed {
            Some(seed) => self.generate_with_seed(seed),
            None => self.generate_with(&mut ConfigGenerator::from_entropy()),
        }
    }

    pub fn generate_with_seed(&self, seed: u64) -> PuzzleConfig {
        self.generate_with(&mut ConfigGenerator::from_seed(seed))
    }

    fn generate_with<R: rand::Rng>(&self, generator: &mut ConfigGenerator<R>) -> PuzzleConfig {
        generator.generate(&self.params())
    }

    pub fn params(&self) -> GeneratorParams {
        GeneratorParams {
            species: self.species,
            individuals: self.individuals,
            min_count: self.min_count,
            max_count: self.max_count,
            relationships: self.relationships,
            capacity: self.capacity,
            capacity_mode: self.capacity_mode,
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub species: Option<usize>,
    pub individuals: Option<u32>,
    pub relationships: Option<usize>,
    pub capacity: Option<u32>,
    pub seed: Option<u64>,
    pub max_solutions: Option<usize>,
    pub max_steps: Option<usize>,
    pub minimal_only: bool,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.limits().max_expansions, DEFAULT_MAX_EXPANSIONS);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("settings.yaml");

        let mut settings = Settings::default();
        settings.generator.seed = Some(42);
        settings.output.format = OutputFormat::Json;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_optional_fields_default_when_missing() {
        let yaml = "generator:\n  species: 2\n  individuals: 3\n  relationships: 1\n  capacity_mode: tight\nsolver:\n  max_expansions: 1000\noutput:\n  format: program\n  output_directory: out\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.generator.capacity, None);
        assert_eq!(settings.generator.capacity_mode, CapacityMode::Tight);
        assert_eq!(settings.solver.max_solutions, None);
        assert!(!settings.solver.minimal_only);
        assert_eq!(settings.output.format, OutputFormat::Program);
        assert_eq!(settings.generator.individuals, Some(3));
        assert_eq!(settings.generator.min_count, DEFAULT_MIN_COUNT);
        assert_eq!(settings.generator.max_count, DEFAULT_MAX_COUNT);
    }

    #[test]
    fn test_validation_rejects_zeroes() {
        let mut settings = Settings::default();
        settings.generator.species = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.generator.capacity = Some(0);
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.solver.max_expansions = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.generator.min_count = 5;
        settings.generator.max_count = 2;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            species: Some(4),
            capacity: Some(3),
            seed: Some(7),
            max_steps: Some(12),
            minimal_only: true,
            ..CliOverrides::default()
        };
        settings.merge_with_cli(&overrides);

        assert_eq!(settings.generator.species, 4);
        assert_eq!(settings.generator.capacity, Some(3));
        assert_eq!(settings.generator.seed, Some(7));
        assert_eq!(settings.limits().max_steps, Some(12));
        assert!(settings.solver.minimal_only);
        assert_eq!(settings.generator.individuals, None);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let mut generator = Settings::default().generator;
        generator.seed = Some(99);
        assert_eq!(generator.generate(), generator.generate());

        generator.capacity = Some(4);
        let config = generator.generate();
        assert_eq!(config.capacity, 4);
        assert_eq!(config.species.len(), 3);
    }

    #[test]
    fn test_seeded_random_counts() {
        let mut generator = Settings::default().generator;
        generator.seed = Some(2024);
        generator.species = 5;
        generator.min_count = 3;
        generator.max_count = 6;

        let config = generator.generate();
        assert!(config.species.iter().all(|s| (3..=6).contains(&s.count)));
        assert_eq!(config, generator.generate());

        generator.individuals = Some(1);
        assert!(generator.generate().species.iter().all(|s| s.count == 1));
    }
}
