use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use mysql_diff::utils::logging::init_logging;
use mysql_diff::{config, Config, MySqlDiffClient};

/// Print the SQL that migrates the OLD MySQL schema into the NEW one
///
/// Each schema is either a SQL file, the name of a database on the configured
/// server, or a quoted remote database description such as
/// '-uroot -hdb.example.com dbname'.
#[derive(Parser, Debug)]
#[command(name = "mysql_diff", version, about)]
struct Cli {
    /// Old schema (SQL file, database name, or '-u<user> -h<host> <dbname>')
    old: String,

    /// New schema (SQL file, database name, or '-u<user> -h<host> <dbname>')
    new: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the mysqldump executable
    #[arg(long)]
    mysqldump: Option<String>,

    /// Treat SQL files as mysqldump output and parse them without a MySQL server
    #[arg(long)]
    raw: bool,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_from_file(&path.to_string_lossy())
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(path) = cli.mysqldump {
        config.dump.mysqldump_path = path;
    }
    if cli.raw {
        config.dump.raw = true;
    }
    match cli.verbose {
        0 => {}
        1 => config.logging.level = "info".to_string(),
        2 => config.logging.level = "debug".to_string(),
        _ => config.logging.level = "trace".to_string(),
    }

    init_logging(&config.logging).context("failed to initialize logging")?;

    let client = MySqlDiffClient::new(config);
    let diff = client
        .diff(&cli.old, &cli.new)
        .await
        .with_context(|| format!("failed to diff {} against {}", cli.old, cli.new))?;

    println!("{}", diff);
    Ok(())
}
