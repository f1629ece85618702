//! `fiscal-calendar` command-line tool.
//!
//! Usage:
//!   fiscal-calendar audit [--json]
//!   fiscal-calendar export --format csv|json|sql [--output PATH] [--config PATH]
//!   fiscal-calendar seed --database PATH [--config PATH]
//!   fiscal-calendar year 2024
//!   fiscal-calendar range 2003 2005
//!   fiscal-calendar week 2005-12-01
//!
//! Logging goes to stderr; `-v` raises the level, `RUST_LOG` overrides it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rusqlite::Connection;

use fiscal_calendar::core::logging;
use fiscal_calendar::seed::{
    audit, records, seed, write_csv, AccountingCalendar, SeedConfig, SqlScriptSeeder, SqliteSeeder,
};
use fiscal_calendar::time::Date;

/// Fiscal calendar reference data tool
#[derive(Parser, Debug)]
#[command(name = "fiscal-calendar", version)]
#[command(about = "Audit, export, seed, and query the CALDAR_RECORD fiscal calendar")]
struct Cli {
    /// More log output (repeat for debug and trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the table and list violations and anomalies
    Audit {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the table as CSV, JSON, or a SQL seed script
    Export {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Seed config for the SQL script (YAML)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Seed a SQLite database
    Seed {
        /// Database file, created if missing
        #[arg(long, short)]
        database: PathBuf,
        /// Seed config (YAML)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// First and last day of a fiscal year
    Year {
        /// Fiscal year
        year: u16,
    },
    /// First day of BEGIN through last day of END
    Range {
        /// First fiscal year
        begin: u16,
        /// Last fiscal year
        end: u16,
    },
    /// The fiscal week containing a date
    Week {
        /// ISO date (YYYY-MM-DD)
        date: Date,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Sql,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    tracing::debug!(?command, "running");
    match command {
        Command::Audit { json } => {
            let report = audit(records());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} records, {} .. {}",
                    report.record_count,
                    report
                        .first_date
                        .map_or_else(|| "-".to_string(), |d| d.to_string()),
                    report
                        .last_date
                        .map_or_else(|| "-".to_string(), |d| d.to_string()),
                );
                println!("{} violations", report.violations.len());
                for v in &report.violations {
                    println!("  {v}");
                }
                println!("{} anomalies", report.anomalies.len());
                for a in &report.anomalies {
                    println!("  {a}");
                }
            }
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }

        Command::Export {
            format,
            output,
            config,
        } => {
            let mut out = open_output(output.as_deref())?;
            match format {
                Format::Csv => write_csv(records(), &mut out).context("writing CSV")?,
                Format::Json => {
                    serde_json::to_writer_pretty(&mut out, records()).context("writing JSON")?;
                    writeln!(out)?;
                }
                Format::Sql => {
                    let config = load_config(config.as_deref())?;
                    let mut seeder = SqlScriptSeeder::new(&mut out, config);
                    seed(&mut seeder).context("writing SQL script")?;
                }
            }
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Seed { database, config } => {
            let config = load_config(config.as_deref())?;
            let mut conn = Connection::open(&database)
                .with_context(|| format!("opening {}", database.display()))?;
            let mut seeder = SqliteSeeder::new(&mut conn, config);
            let outcome = seed(&mut seeder)
                .with_context(|| format!("seeding {}", database.display()))?;
            println!("{outcome}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Year { year } => {
            let range = AccountingCalendar::embedded().year_start_and_end(year)?;
            println!("{year}: {range} ({} weeks)", range.weeks());
            Ok(ExitCode::SUCCESS)
        }

        Command::Range { begin, end } => {
            let range = AccountingCalendar::embedded().accounting_range(begin, end)?;
            println!("{begin}-{end}: {range}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Week { date } => {
            let cal = AccountingCalendar::embedded();
            let week = cal
                .week_containing(date)
                .with_context(|| format!("no fiscal week contains {date}"))?;
            if let Some(year) = cal.fiscal_year_of(date) {
                println!("fiscal year {year}");
            }
            println!("{}", serde_json::to_string_pretty(week)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("creating {}", p.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn load_config(path: Option<&Path>) -> Result<SeedConfig> {
    match path {
        Some(p) => SeedConfig::from_file(p).with_context(|| format!("reading {}", p.display())),
        None => Ok(SeedConfig::default()),
    }
}
