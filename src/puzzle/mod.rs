//! Puzzle instances: data model, generation, metrics and statement text

pub mod config;
pub mod generator;
pub mod io;
pub mod metrics;

pub use config::{PuzzleConfig, Relationship, Species};
pub use generator::{
    CapacityMode, ConfigGenerator, GeneratorParams, DEFAULT_MAX_COUNT, DEFAULT_MIN_COUNT,
};
pub use io::{describe, load_config_from_file, load_puzzle, parse_statement, save_config_to_file};
pub use metrics::{DifficultyCategory, DifficultyEstimate};
