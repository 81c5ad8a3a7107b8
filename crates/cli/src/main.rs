//! Command-line entrypoint for validating book catalogs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use bookshelf::books::{self, BookError, CatalogError};
use bookshelf_kernel::settings::Settings;

/// Validate book catalogs and inspect individual records.
#[derive(Parser, Debug)]
#[command(name = "bookshelf-cli", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON on stdout and structured error bodies on stderr.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a catalog and validate every record, stopping at the first failure.
    Validate {
        /// JSON file holding an array of book records
        file: PathBuf,
    },

    /// Print the snapshot of one record.
    Show {
        file: PathBuf,

        /// Position of the record in the catalog
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Field to leave out of the snapshot (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Check a single ISBN-10 value.
    CheckIsbn { value: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut telemetry = match Settings::load() {
        Ok(settings) => settings.telemetry,
        Err(e) => {
            eprintln!("warning: {e:#}; using default settings");
            Default::default()
        }
    };
    if std::env::var_os("RUST_LOG").is_none() {
        telemetry.level = bookshelf_telemetry::level_for_verbosity(cli.verbose).to_string();
    }
    bookshelf_telemetry::init(&telemetry);

    tracing::debug!(command = ?cli.command, "bookshelf-cli starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, cli.json);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Validate { file } => {
            let books = books::load_catalog(file)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else {
                for book in &books {
                    println!("{book}");
                }
                println!("{} record(s) valid", books.len());
            }
        }
        Commands::Show {
            file,
            index,
            exclude,
        } => {
            let books = books::load_catalog(file)?;
            let Some(book) = books.get(*index) else {
                bail!(
                    "record index {} out of range; catalog has {} record(s)",
                    index,
                    books.len()
                );
            };
            let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();
            let snapshot = book.snapshot_excluding(&exclude);
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot).context("failed to render snapshot")?
            );
        }
        Commands::CheckIsbn { value } => {
            books::check_isbn_10(value)?;
            println!("valid");
        }
    }

    Ok(())
}

fn report(error: &anyhow::Error, json: bool) {
    tracing::error!("{error:#}");

    if !json {
        eprintln!("error: {error:#}");
        return;
    }

    let body = if let Some(catalog) = error.downcast_ref::<CatalogError>() {
        catalog.to_body()
    } else if let Some(book) = error.downcast_ref::<BookError>() {
        book.to_body()
    } else {
        serde_json::json!({
            "error": {
                "code": "internal_error",
                "message": format!("{error:#}"),
                "details": [],
            }
        })
    };
    eprintln!("{body}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_with_excludes() {
        let cli = Cli::try_parse_from([
            "bookshelf-cli",
            "show",
            "data.json",
            "--index",
            "1",
            "--exclude",
            "price",
            "--exclude",
            "author2",
        ])
        .unwrap();

        match cli.command {
            Commands::Show { index, exclude, .. } => {
                assert_eq!(index, 1);
                assert_eq!(exclude, vec!["price", "author2"]);
            }
            other => panic!("Expected Show command, got {other:?}"),
        }
    }
}
