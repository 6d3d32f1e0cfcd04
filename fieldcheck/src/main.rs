//! Run a rules file against a sequence of partial form states.
//!
//! Each state file is one validation pass, applied in the order given, so a
//! run reproduces how a form evolves as the user edits it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use fieldcheck::io::rules_file::load_rules_file;
use fieldcheck::io::state_file::load_state;
use fieldcheck::{Engine, ValidationResult, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "fieldcheck",
    version,
    about = "Incremental rule-based form validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate state files in order and print the result as JSON.
    Check {
        /// Rules file (TOML).
        #[arg(short, long)]
        rules: PathBuf,
        /// Templates registered globally before the engine is built.
        #[arg(short, long)]
        globals: Option<PathBuf>,
        /// Print the result after every pass instead of only the last.
        #[arg(long)]
        each: bool,
        /// Partial state files (JSON objects), one pass each.
        #[arg(required = true)]
        states: Vec<PathBuf>,
    },
    /// Build an engine from a rules file and report the rule count.
    Lint {
        /// Rules file (TOML).
        #[arg(short, long)]
        rules: PathBuf,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check {
            rules,
            globals,
            each,
            states,
        } => cmd_check(&rules, globals.as_deref(), each, &states),
        Command::Lint { rules } => cmd_lint(&rules),
    }
}

fn cmd_check(
    rules_path: &Path,
    globals: Option<&Path>,
    each: bool,
    states: &[PathBuf],
) -> Result<i32> {
    if let Some(globals) = globals {
        let templates = load_rules_file(globals)?.templates;
        Engine::register_global_rules(templates)
            .with_context(|| format!("register globals from {}", globals.display()))?;
    }
    let mut engine = build_engine(rules_path)?;

    let mut last = None;
    for path in states {
        let partial = load_state(path)?;
        let result = engine
            .validate(partial)
            .with_context(|| format!("validate {}", path.display()))?;
        if each {
            print_json(&result)?;
        }
        last = Some(result);
    }

    let Some(result) = last else {
        return Ok(exit_codes::OK);
    };
    if !each {
        print_json(&result)?;
    }
    Ok(exit_code_for(&result))
}

fn cmd_lint(rules_path: &Path) -> Result<i32> {
    let engine = build_engine(rules_path)?;
    println!(
        "{}: {} rules on {} fields",
        rules_path.display(),
        engine.rules().len(),
        distinct_fields(&engine)
    );
    Ok(exit_codes::OK)
}

fn build_engine(rules_path: &Path) -> Result<Engine> {
    load_rules_file(rules_path)?
        .build_engine()
        .with_context(|| format!("build engine from {}", rules_path.display()))
}

fn distinct_fields(engine: &Engine) -> usize {
    let mut fields: Vec<&str> = engine.rules().iter().map(|r| r.field.as_str()).collect();
    fields.sort_unstable();
    fields.dedup();
    fields.len()
}

fn exit_code_for(result: &ValidationResult) -> i32 {
    if result.is_valid {
        exit_codes::OK
    } else {
        exit_codes::INVALID
    }
}

/// Print `value` as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize result")?;
    println!("{}", payload);
    Ok(())
}
