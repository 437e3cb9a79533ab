//! # ctc CLI Entry Point
//!
//! Thin front end over the library:
//! - `parse`: show how a compiler command line is understood
//! - `hash`: fingerprint one command line
//! - `compdb`: fingerprint every entry of a `compile_commands.json`

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ctc::compdb;
use ctc::config::{self, CtcConfig};
use ctc::dialect::Dialect;
use ctc::error::{FingerprintError, ParseError};
use ctc::feedback::PreprocessFeedback;
use ctc::fingerprint::Fingerprinter;
use ctc::invocation::{self, CompilerInvocation};
use ctc::ui;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_utf8_console() {}

#[derive(Parser)]
#[command(name = "ctc")]
#[command(about = "Fingerprint C/C++ compile commands by their preprocessed source", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Log preprocessor command lines and config lookups
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a compile command line is parsed
    Parse {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// The command line, as one quoted string or as separate words after `--`
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Fingerprint a single compile command
    Hash {
        /// Directory the command runs in [default: current directory]
        #[arg(long)]
        dir: Option<PathBuf>,
        /// The command line, as one quoted string or as separate words after `--`
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Fingerprint every entry of a compilation database
    Compdb {
        /// Path to compile_commands.json
        #[arg(default_value = compdb::DEFAULT_DATABASE)]
        path: PathBuf,
        /// Number of parallel preprocessor runs
        #[arg(short, long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        jobs: Option<usize>,
    },
    /// Generate shell completions
    Completion { shell: Shell },
}

#[derive(Serialize)]
struct ParseReport<'a> {
    #[serde(flatten)]
    invocation: &'a CompilerInvocation,
    dialect: Dialect,
}

fn main() -> Result<()> {
    enable_utf8_console();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let success = match &cli.command {
        Commands::Parse { json, command } => parse_command(command, *json)?,
        Commands::Hash { dir, command } => hash_command(dir.as_deref(), command)?,
        Commands::Compdb { path, jobs } => compdb_command(path, *jobs)?,
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// One argument is a full command line; several are already split words.
fn invocation_from_args(words: &[String]) -> Result<CompilerInvocation, ParseError> {
    match words {
        [line] => invocation::parse(line),
        _ => CompilerInvocation::from_words(words.iter().cloned()),
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine current directory")
}

fn parse_command(words: &[String], json: bool) -> Result<bool> {
    let invocation = match invocation_from_args(words) {
        Ok(inv) => inv,
        Err(e) => {
            println!("{} {}", "x".red(), e);
            return Ok(false);
        }
    };

    let config = config::load_config(&current_dir()?)?;
    let dialect = Dialect::detect(invocation.compiler(), &config.fingerprint.msvc_compilers);

    if json {
        let report = ParseReport {
            invocation: &invocation,
            dialect,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(true);
    }

    println!("{:>10} {}", "compiler".bold(), invocation.compiler());
    println!("{:>10} {:?}", "dialect".bold(), dialect);
    println!("{:>10} {}", "input".bold(), invocation.input_path().cyan());
    println!("{:>10} {}", "output".bold(), invocation.output_path().cyan());
    if invocation.arguments().is_empty() {
        println!("{:>10} {}", "arguments".bold(), "(none)".dimmed());
    } else {
        println!("{:>10}", "arguments".bold());
        for arg in invocation.arguments() {
            println!("           {}", arg);
        }
    }
    Ok(true)
}

fn hash_command(dir: Option<&Path>, words: &[String]) -> Result<bool> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => current_dir()?,
    };
    let config = config::load_config(&dir)?;
    let fingerprinter = config.configure(Fingerprinter::new());

    let result = match invocation_from_args(words) {
        Ok(inv) => fingerprinter
            .compute(&dir, &inv)
            .map_err(FingerprintError::from),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(fingerprint) => {
            println!("{}", fingerprint);
            Ok(true)
        }
        Err(e) => {
            report_failure(&e);
            Ok(false)
        }
    }
}

fn report_failure(err: &FingerprintError) {
    eprintln!("{} {}", "x".red(), err);

    if let FingerprintError::Compute(compute) = err {
        if let Some(output) = compute.compiler_output()
            && !output.trim().is_empty()
        {
            eprintln!("{}", output.trim_end().dimmed());
        }
        if let Some(hint) = PreprocessFeedback::for_error(compute) {
            eprintln!("   {} {}", "💡".yellow(), hint.replace('\n', "\n      "));
        }
    }
}

fn compdb_command(path: &Path, jobs: Option<usize>) -> Result<bool> {
    let start_time = Instant::now();
    let entries = compdb::load(path)?;
    if entries.is_empty() {
        println!("{} {} has no entries.", "!".yellow(), path.display());
        return Ok(true);
    }

    let config_dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => current_dir()?,
    };
    let config: CtcConfig = config::load_config(&config_dir)?;
    let fingerprinter = config.configure(Fingerprinter::new());

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs.or(config.fingerprint.jobs) {
        pool = pool.num_threads(jobs);
    }
    let pool = pool.build().context("Failed to start worker threads")?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Preprocessing...");

    let results = pool.install(|| {
        compdb::fingerprint_all_with(&fingerprinter, &entries, |entry| {
            pb.set_message(entry.file.clone());
            pb.inc(1);
        })
    });
    pb.finish_and_clear();

    let mut table = ui::Table::new(&["File", "Fingerprint"]);
    let mut failures = Vec::new();
    for (entry, result) in entries.iter().zip(&results) {
        match result {
            Ok(fingerprint) => table.add_row(vec![entry.file.clone(), fingerprint.to_hex()]),
            Err(e) => {
                table.add_row(vec![entry.file.clone(), format!("{}", "failed".red())]);
                failures.push((entry, e));
            }
        }
    }
    table.print();

    for (entry, err) in &failures {
        eprintln!();
        eprintln!("{} {}", "x".red(), entry.file.bold());
        report_failure(err);
    }

    let ok = results.len() - failures.len();
    println!(
        "{} {} fingerprinted, {} failed in {:.2?}",
        if failures.is_empty() {
            "✓".green()
        } else {
            "!".yellow()
        },
        ok,
        failures.len(),
        start_time.elapsed()
    );

    Ok(failures.is_empty())
}
