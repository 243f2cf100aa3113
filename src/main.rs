//! Main CLI application for the transport puzzle tools

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use river_transport::{
    config::{CliOverrides, OutputFormat, Settings},
    puzzle::{describe, load_puzzle, save_config_to_file, DifficultyEstimate, PuzzleConfig, Relationship, Species},
    program::ProgramCompiler,
    transport::{run_batch, BatchSummary, TransportProblem},
    utils::{ColorOutput, SolutionFormatter},
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "river_transport")]
#[command(about = "Transport puzzle compiler, solver and verifier")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random puzzle
    Generate {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Number of species (overrides config)
        #[arg(long)]
        species: Option<usize>,

        /// Individuals per species (overrides config)
        #[arg(long)]
        individuals: Option<u32>,

        /// Number of predator/prey relationships (overrides config)
        #[arg(long)]
        relationships: Option<usize>,

        /// Shuttle capacity (overrides config)
        #[arg(long)]
        capacity: Option<u32>,

        /// Random seed for reproducible puzzles
        #[arg(long)]
        seed: Option<u64>,

        /// Write the puzzle JSON here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the problem statement of a puzzle
    Describe {
        /// Puzzle JSON file or problem statement (.txt)
        puzzle: PathBuf,
    },

    /// Compile a puzzle into its logic program
    Compile {
        /// Puzzle JSON file or problem statement (.txt)
        puzzle: PathBuf,

        /// Write the program here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print program statistics
        #[arg(long)]
        stats: bool,
    },

    /// Enumerate solutions of a puzzle
    Solve {
        /// Puzzle JSON file or problem statement (.txt)
        puzzle: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Maximum solutions to report (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Longest path to consider (overrides config)
        #[arg(long)]
        max_steps: Option<usize>,

        /// Only report solutions of the minimal step count
        #[arg(long)]
        minimal: bool,

        /// Output format (overrides config)
        #[arg(short, long, value_parser = parse_format)]
        format: Option<OutputFormat>,

        /// Save results to this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show bank contents after every step
        #[arg(long)]
        show_states: bool,
    },

    /// Verify a candidate solution
    Verify {
        /// Puzzle JSON file or problem statement (.txt)
        puzzle: PathBuf,

        /// Candidate solution, one step per line
        solution: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Explain why a candidate is rejected
        #[arg(long)]
        explain: bool,
    },

    /// Estimate puzzle difficulty
    Analyze {
        /// Puzzle JSON file or problem statement (.txt)
        puzzle: PathBuf,
    },

    /// Generate and solve many puzzles in parallel
    Batch {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Number of puzzles
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// First seed; puzzles use consecutive seeds
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Write entries as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Generate {
            config,
            species,
            individuals,
            relationships,
            capacity,
            seed,
            output,
        } => {
            let overrides = CliOverrides {
                species,
                individuals,
                relationships,
                capacity,
                seed,
                ..CliOverrides::default()
            };
            generate_command(config, overrides, output)
        }
        Commands::Describe { puzzle } => describe_command(puzzle),
        Commands::Compile { puzzle, output, stats } => compile_command(puzzle, output, stats),
        Commands::Solve {
            puzzle,
            config,
            max_solutions,
            max_steps,
            minimal,
            format,
            output,
            show_states,
        } => {
            let overrides = CliOverrides {
                max_solutions,
                max_steps,
                minimal_only: minimal,
                format,
                output_dir: output.clone(),
                ..CliOverrides::default()
            };
            solve_command(puzzle, config, overrides, output.is_some(), show_states)
        }
        Commands::Verify {
            puzzle,
            solution,
            config,
            explain,
        } => verify_command(puzzle, solution, config, explain),
        Commands::Analyze { puzzle } => analyze_command(puzzle),
        Commands::Batch {
            config,
            count,
            seed,
            output,
        } => batch_command(config, count, seed, output),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    match value {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "program" => Ok(OutputFormat::Program),
        other => Err(format!("unknown format `{}` (expected text, json or program)", other)),
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
        Ok(Settings::default())
    }
}

fn generate_command(config_path: PathBuf, overrides: CliOverrides, output: Option<PathBuf>) -> Result<()> {
    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);
    settings.validate().context("Configuration validation failed")?;

    let config = settings.generator.generate();
    match output {
        Some(path) => {
            save_config_to_file(&config, &path)?;
            println!("{}", ColorOutput::success(&format!("Puzzle saved to {}", path.display())));
        }
        None => println!("{}", config.to_json().context("Failed to serialize puzzle")?),
    }

    println!("\n{}", describe(&config));
    Ok(())
}

fn describe_command(puzzle: PathBuf) -> Result<()> {
    let config = load_puzzle(&puzzle)?;
    print!("{}", describe(&config));
    Ok(())
}

fn compile_command(puzzle: PathBuf, output: Option<PathBuf>, stats: bool) -> Result<()> {
    let config = load_puzzle(&puzzle)?;
    let compiler = ProgramCompiler::new(&config).context("Failed to compile puzzle")?;
    let program = compiler.compile();

    match output {
        Some(path) => {
            std::fs::write(&path, &program.text)
                .with_context(|| format!("Failed to write program: {}", path.display()))?;
            println!("{}", ColorOutput::success(&format!("Program written to {}", path.display())));
        }
        None => print!("{}", program),
    }

    if stats {
        println!("\n{}", program.statistics);
    }
    Ok(())
}

fn solve_command(
    puzzle: PathBuf,
    config_path: PathBuf,
    overrides: CliOverrides,
    save: bool,
    show_states: bool,
) -> Result<()> {
    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);
    settings.validate().context("Configuration validation failed")?;

    let problem = TransportProblem::from_file(settings.clone(), &puzzle)?;
    println!("{}", ColorOutput::info("Solving transport puzzle..."));
    println!("{}", problem.statistics());

    let report = problem.solve()?;
    if report.is_empty() {
        println!("{}", ColorOutput::warning("No solutions found"));
        return Ok(());
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Found {} solution(s) in {:.3}s",
            report.solutions.len(),
            report.solve_time.as_secs_f64()
        ))
    );

    match settings.output.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize solutions")?
        ),
        OutputFormat::Program => print!("{}", problem.program()),
        OutputFormat::Text => {
            println!("\n{}", SolutionFormatter::format_solution_summary(&report));
            for (i, (solution, lines)) in report.solutions.iter().zip(&report.lines).enumerate().take(3) {
                println!(
                    "{}",
                    SolutionFormatter::format_solution(i, solution, lines, &problem.program().species, show_states)
                );
            }
        }
    }

    if save {
        SolutionFormatter::save_solutions(
            &report,
            &problem.program().text,
            &settings.output.output_directory,
            &settings.output.format,
        )
        .context("Failed to save solutions")?;
        println!(
            "{}",
            ColorOutput::success(&format!("Results saved to {}", settings.output.output_directory.display()))
        );
    }

    Ok(())
}

fn verify_command(puzzle: PathBuf, solution: PathBuf, config_path: PathBuf, explain: bool) -> Result<()> {
    let settings = load_settings(&config_path)?;
    let problem = TransportProblem::from_file(settings, &puzzle)?;

    let text = std::fs::read_to_string(&solution)
        .with_context(|| format!("Failed to read solution file: {}", solution.display()))?;
    let lines: Vec<&str> = text.lines().collect();

    let valid = problem.verify(&lines)?;
    if valid {
        println!("{}", ColorOutput::success("Solution is valid"));
    } else {
        println!("{}", ColorOutput::error("Solution is invalid"));
    }

    if explain {
        println!("\n{}", problem.validate(&lines)?);
    }
    Ok(())
}

fn analyze_command(puzzle: PathBuf) -> Result<()> {
    let config = load_puzzle(&puzzle)?;
    println!("{}", ColorOutput::heading("Puzzle"));
    print!("{}", describe(&config));
    println!("\n{}", DifficultyEstimate::analyze(&config));
    Ok(())
}

fn batch_command(config_path: PathBuf, count: usize, seed: u64, output: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(&config_path)?;
    settings.validate().context("Configuration validation failed")?;

    println!("{}", ColorOutput::info(&format!("Running {} puzzles from seed {}...", count, seed)));
    let entries = run_batch(&settings, seed, count);

    println!("{}", SolutionFormatter::format_batch(&entries));
    println!("{}", BatchSummary::from_entries(&entries));

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&entries).context("Failed to serialize batch")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write batch results: {}", path.display()))?;
        println!("{}", ColorOutput::success(&format!("Batch saved to {}", path.display())));
    }
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let puzzle_dir = directory.join("puzzles");
    let output_dir = directory.join("output/puzzles");

    for dir in [&config_dir, &puzzle_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    let mut quick = Settings::default();
    quick.generator.species = 2;
    quick.generator.relationships = 1;
    quick.solver.max_solutions = Some(3);
    quick.to_file(&examples_dir.join("quick.yaml"))?;

    let mut minimal = Settings::default();
    minimal.solver.minimal_only = true;
    minimal.solver.max_solutions = None;
    minimal.to_file(&examples_dir.join("minimal.yaml"))?;
    println!("Created example configurations in: {}", examples_dir.display());

    let sample = PuzzleConfig::new(
        vec![Species::new("goats", 2), Species::new("wolves", 2)],
        vec![Relationship::new("wolves", "goats")],
        2,
    );
    save_config_to_file(&sample, puzzle_dir.join("goats_and_wolves.json"))?;
    std::fs::write(puzzle_dir.join("goats_and_wolves.txt"), describe(&sample))
        .context("Failed to write sample problem statement")?;
    std::fs::write(
        puzzle_dir.join("goats_and_wolves.solution.txt"),
        "2 wolves cross left -> right\n1 wolves cross right -> left\n2 goats cross left -> right\n1 wolves cross right -> left\n2 wolves cross left -> right\n",
    )
    .context("Failed to write sample solution")?;
    println!("Created sample puzzle in: {}", puzzle_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: river_transport solve puzzles/goats_and_wolves.json --minimal");
    println!("3. Run: river_transport verify puzzles/goats_and_wolves.json puzzles/goats_and_wolves.solution.txt");
    println!("4. Run: river_transport verify puzzles/goats_and_wolves.txt puzzles/goats_and_wolves.solution.txt");

    Ok(())
}
