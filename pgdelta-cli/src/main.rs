//! CLI entry point for pgdelta.
//! Provides clap-based command routing, exit code mapping based on error type,
//! and the split between the SQL script on stdout and diagnostics on stderr.

mod output;

use std::process;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;

use pgdelta_core::config::{CliOverrides, PgDeltaConfig, SourceOverrides};
use pgdelta_core::db::is_transient_error;
use pgdelta_core::error::PgDeltaError;
use pgdelta_core::PgDelta;

/// Top-level CLI definition with global flags and subcommand dispatch.
#[derive(Parser)]
#[command(
    name = "pgdelta",
    about = "Compare two PostgreSQL schemas and print the SQL that makes db2 match db1",
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true
)]
struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<String>,

    #[command(flatten)]
    db1: Db1Args,

    #[command(flatten)]
    db2: Db2Args,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Connection flags for db1, the database holding the desired schema.
#[derive(Args)]
struct Db1Args {
    /// db1 connection URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    url1: Option<String>,

    /// db1 host
    #[arg(long, value_name = "HOST", global = true)]
    host1: Option<String>,

    /// db1 port
    #[arg(long, value_name = "PORT", global = true)]
    port1: Option<u16>,

    /// db1 user
    #[arg(long, value_name = "USER", global = true)]
    user1: Option<String>,

    /// db1 password
    #[arg(long, value_name = "PASSWORD", global = true)]
    password1: Option<String>,

    /// db1 database name
    #[arg(long, value_name = "NAME", global = true)]
    dbname1: Option<String>,

    /// db1 schema, or * for every non-system schema
    #[arg(long, value_name = "SCHEMA", global = true)]
    schema1: Option<String>,

    /// db1 SSL/TLS mode: disable, prefer, require
    #[arg(long, value_name = "MODE", global = true)]
    ssl_mode1: Option<String>,
}

/// Connection flags for db2, the database the script is meant for.
#[derive(Args)]
struct Db2Args {
    /// db2 connection URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    url2: Option<String>,

    /// db2 host
    #[arg(long, value_name = "HOST", global = true)]
    host2: Option<String>,

    /// db2 port
    #[arg(long, value_name = "PORT", global = true)]
    port2: Option<u16>,

    /// db2 user
    #[arg(long, value_name = "USER", global = true)]
    user2: Option<String>,

    /// db2 password
    #[arg(long, value_name = "PASSWORD", global = true)]
    password2: Option<String>,

    /// db2 database name
    #[arg(long, value_name = "NAME", global = true)]
    dbname2: Option<String>,

    /// db2 schema, or * for every non-system schema
    #[arg(long, value_name = "SCHEMA", global = true)]
    schema2: Option<String>,

    /// db2 SSL/TLS mode: disable, prefer, require
    #[arg(long, value_name = "MODE", global = true)]
    ssl_mode2: Option<String>,
}

impl From<Db1Args> for SourceOverrides {
    fn from(a: Db1Args) -> Self {
        SourceOverrides {
            url: a.url1,
            host: a.host1,
            port: a.port1,
            user: a.user1,
            password: a.password1,
            database: a.dbname1,
            schema: a.schema1,
            ssl_mode: a.ssl_mode1,
        }
    }
}

impl From<Db2Args> for SourceOverrides {
    fn from(a: Db2Args) -> Self {
        SourceOverrides {
            url: a.url2,
            host: a.host2,
            port: a.port2,
            user: a.user2,
            password: a.password2,
            database: a.dbname2,
            schema: a.schema2,
            ssl_mode: a.ssl_mode2,
        }
    }
}

/// All available pgdelta subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compare the given object kinds and print the SQL for db2
    Diff {
        /// Object kinds to compare (ALL, SCHEMA, ROLE, TABLE, ...)
        #[arg(value_name = "KIND", required = true)]
        kinds: Vec<String>,

        /// Output classes to print: line|notice|error
        #[arg(long, value_name = "TYPES")]
        output: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Print per-kind counters to stderr
        #[arg(long)]
        summary: bool,
    },

    /// List the supported object kinds
    Kinds,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keep stdout clean for JSON: only errors are logged
    let json = matches!(cli.command, Commands::Diff { json: true, .. });
    let filter = if json || cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::new()
        .parse_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli).await {
        print_error(&e);
        process::exit(exit_code(&e));
    }
}

/// Map error types to differentiated exit codes.
fn exit_code(error: &PgDeltaError) -> i32 {
    match error {
        PgDeltaError::ConfigError(_) | PgDeltaError::UnsupportedKind(_) => 2,
        PgDeltaError::SchemaMismatch { .. } => 3,
        PgDeltaError::DatabaseError(_) | PgDeltaError::ConnectionLost { .. } => 4,
        PgDeltaError::IntrospectionFailed { .. } => 5,
        _ => 1,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PgDeltaError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| PgDeltaError::IoError(std::io::Error::other(e)))?;
    println!("{}", text);
    Ok(())
}

/// Build configuration and dispatch the chosen subcommand.
async fn run(cli: Cli) -> Result<(), PgDeltaError> {
    let Commands::Diff {
        kinds,
        output: output_types,
        json,
        summary,
    } = cli.command
    else {
        // Kinds needs neither config nor a connection
        output::print_kinds();
        return Ok(());
    };

    let overrides = CliOverrides {
        db1: cli.db1.into(),
        db2: cli.db2.into(),
        output: output_types,
    };
    let config = PgDeltaConfig::load(cli.config.as_deref(), &overrides)?;
    let mask = config.output;

    let delta = PgDelta::new(config).await?;
    let report = delta.compare(&kinds).await?;

    if json {
        output::write_errors(&report.fragments, &mut std::io::stderr().lock())?;
        print_json(&output::masked_report(&report, mask))?;
    } else {
        output::print_script(&report, mask)?;
    }
    if summary && !cli.quiet {
        output::print_summary(&report);
    }

    Ok(())
}

/// Print a formatted error message with actionable hints to stderr.
fn print_error(error: &PgDeltaError) {
    eprintln!("{} {}", "ERROR:".red().bold(), error);

    match error {
        PgDeltaError::ConfigError(_) => {
            eprintln!(
                "{}",
                "Hint: Check your pgdelta.toml or set PGDELTA_DB1_URL and PGDELTA_DB2_URL."
                    .dimmed()
            );
        }
        PgDeltaError::UnsupportedKind(_) => {
            eprintln!(
                "{}",
                "Hint: Run 'pgdelta kinds' to list the supported object kinds.".dimmed()
            );
        }
        PgDeltaError::SchemaMismatch { .. } => {
            eprintln!(
                "{}",
                "Hint: Use --schema1 '*' --schema2 '*' to compare every schema, or name one schema on each side."
                    .dimmed()
            );
        }
        e if is_transient_error(e) => {
            eprintln!(
                "{}",
                "Hint: The connection dropped. Retry, or set connect_retries in pgdelta.toml."
                    .dimmed()
            );
        }
        PgDeltaError::DatabaseError(_) => {
            eprintln!(
                "{}",
                "Hint: Verify both databases are running and connection details are correct."
                    .dimmed()
            );
        }
        _ => {}
    }
}
