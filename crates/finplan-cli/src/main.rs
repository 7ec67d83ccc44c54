use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::replay::ReplayArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded conversation and render its transcript
    Replay {
        /// Recorded transcript, one JSON event per line
        transcript: PathBuf,

        /// The question the conversation was asked
        #[arg(short, long, default_value = "Should I invest in VOO?")]
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
        format: OutputFormat,

        /// Pause between events, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Color theme for console output
        #[arg(long, value_enum, default_value_t = display::Theme::Dark)]
        theme: display::Theme,
    },

    /// Print the version
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Framed panels for a terminal
    Console,
    /// Markup fragments, as streamed to the web page
    Html,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            transcript,
            query,
            format,
            delay_ms,
            theme,
        } => {
            commands::replay::execute(ReplayArgs {
                transcript,
                query,
                format,
                delay_ms,
                theme,
            })
            .await
        }
        Command::Version => commands::version::execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay_defaults() {
        let cli = Cli::try_parse_from(["finplan", "replay", "run.jsonl"]).unwrap();
        let Command::Replay {
            transcript,
            query,
            format,
            delay_ms,
            theme,
        } = cli.command
        else {
            panic!("expected replay command");
        };
        assert_eq!(transcript, PathBuf::from("run.jsonl"));
        assert_eq!(query, "Should I invest in VOO?");
        assert_eq!(format, OutputFormat::Console);
        assert_eq!(delay_ms, 0);
        assert_eq!(theme, display::Theme::Dark);
    }

    #[test]
    fn test_parse_replay_html() {
        let cli = Cli::try_parse_from([
            "finplan", "replay", "run.jsonl", "--format", "html", "--delay-ms", "250", "-q",
            "Roth or traditional?",
        ])
        .unwrap();
        let Command::Replay {
            query,
            format,
            delay_ms,
            ..
        } = cli.command
        else {
            panic!("expected replay command");
        };
        assert_eq!(query, "Roth or traditional?");
        assert_eq!(format, OutputFormat::Html);
        assert_eq!(delay_ms, 250);
    }
}
