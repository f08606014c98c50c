use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};

// Exit codes: config problems vs evaluation problems
const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 1;
const EXIT_EVAL: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "tha")]
#[command(about = "Deterministic True Health Age calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the questionnaire config (YAML or JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Chronological age in years
    #[arg(short, long)]
    age: f64,

    /// JSON file mapping item ids to raw answers; defaults every item
    /// to its middle bin when omitted
    #[arg(short = 'n', long)]
    answers: Option<PathBuf>,

    /// Enable verbose logging (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Load and validate config
    let config = match tha::config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e:#}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    let engine = match tha::ThaEngine::new(config) {
        Ok(engine) => engine,
        Err(tha::ThaError::Configuration(errors)) => {
            eprintln!("Config errors:");
            for error in &errors {
                eprintln!("  - {error}");
            }
            std::process::exit(EXIT_CONFIG);
        }
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Resolve answers
    let answers = match cli.answers {
        Some(ref path) => match load_answers(path) {
            Ok(answers) => answers,
            Err(e) => {
                eprintln!("Answers error: {e:#}");
                std::process::exit(EXIT_EVAL);
            }
        },
        None => {
            log::info!("no answers file given, defaulting every item to its middle bin");
            engine.middle_bin_answers()
        }
    };

    // Evaluate and print
    let result = match engine.compute(cli.age, &answers) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Evaluation error: {e}");
            std::process::exit(EXIT_EVAL);
        }
    };

    let summary = tha::output::summarize(&result);
    match tha::output::to_pretty_json(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Output error: {e}");
            std::process::exit(EXIT_EVAL);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn load_answers(path: &Path) -> anyhow::Result<tha::AnswerMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file at {}", path.display()))?;
    let answers = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse answers: invalid JSON in {}", path.display()))?;
    Ok(answers)
}
