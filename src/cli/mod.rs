pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Job tracker - manage job applications from the command line")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, conflicts_with = "json", help = "Output in human-readable text format (default)")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create database tables that do not exist yet")]
    Migrate,

    #[command(about = "Job listings and applications")]
    Jobs {
        #[command(subcommand)]
        cmd: commands::jobs::JobsCommands,
    },

    #[command(about = "Search time periods")]
    TimePeriods {
        #[command(subcommand)]
        cmd: commands::time_periods::TimePeriodsCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        match (cli.text, cli.json) {
            (false, true) => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Jobs { cmd } => commands::jobs::handle(cmd, output_format).await,
        Commands::TimePeriods { cmd } => commands::time_periods::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_global_output_flag() {
        let cli = Cli::try_parse_from(["tracker", "--json", "time-periods", "list"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::TimePeriods { .. }));

        let cli = Cli::try_parse_from(["tracker", "jobs", "list", "--text"]).unwrap();
        assert!(cli.text);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);

        let cli = Cli::try_parse_from(["tracker", "jobs", "list"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }

    #[test]
    fn test_output_flags_conflict() {
        let error = Cli::try_parse_from(["tracker", "--text", "--json", "jobs", "list"]).err().unwrap();
        assert_eq!(error.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_parses_serve_flags() {
        let cli = Cli::try_parse_from(["tracker", "serve", "--memory", "--port", "4000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.memory);
                assert_eq!(args.port, Some(4000));
            }
            _ => panic!("expected serve"),
        }
    }
}
