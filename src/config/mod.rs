//! Configuration management for the transport puzzle tools

pub mod settings;

pub use settings::{
    CliOverrides, GeneratorConfig, OutputConfig, OutputFormat, Settings, SolverConfig,
};
