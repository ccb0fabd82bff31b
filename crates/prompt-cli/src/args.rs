//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use prompt_engine::{ExportFormat, FallbackPolicy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "promptctl")]
#[command(about = "Parse, render, check and export {{variable}} prompt templates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file (defaults to PROMPT_RS_* variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a template's variables and diagnostics
    Parse {
        /// Template file
        file: PathBuf,

        /// Print the parse result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a template against JSON data
    Render {
        /// Template file
        file: PathBuf,

        /// JSON object with the variable values
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// What to write for variables without a value
        #[arg(long, value_enum, default_value_t = FallbackArg::Keep)]
        fallback: FallbackArg,

        /// JSON object with values for `--fallback default`
        #[arg(long)]
        defaults: Option<PathBuf>,

        /// Exit with status 2 when any variable is missing
        #[arg(long)]
        strict: bool,

        /// Print the render result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a template as highlighted HTML
    Highlight {
        /// Template file
        file: PathBuf,
    },

    /// Export a prompt definition
    Export {
        /// Prompt definition JSON file
        definition: PathBuf,

        /// json, langchain, langchain-chat, markdown or openai
        #[arg(long, short, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write `<key><extension>` into this directory instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Single-line output for the json format
        #[arg(long)]
        compact: bool,
    },

    /// Build a shareable preview link for a prompt definition
    PreviewLink {
        /// Prompt definition JSON file
        definition: PathBuf,

        /// Base URL of the preview page
        #[arg(long)]
        base_url: String,
    },

    /// Print the prompt definition carried by a preview link
    DecodeLink {
        link: String,
    },

    /// List recently parsed or rendered templates
    Recent {
        /// Forget all recent templates
        #[arg(long)]
        clear: bool,
    },
}

/// Fallback policy as a command-line value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FallbackArg {
    Keep,
    Empty,
    Default,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Keep => Self::Keep,
            FallbackArg::Empty => Self::Empty,
            FallbackArg::Default => Self::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::try_parse_from([
            "promptctl",
            "render",
            "greeting.txt",
            "--data",
            "data.json",
            "--fallback",
            "empty",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Render {
                file,
                data,
                fallback,
                strict,
                json,
                ..
            } => {
                assert_eq!(file, PathBuf::from("greeting.txt"));
                assert_eq!(data, Some(PathBuf::from("data.json")));
                assert_eq!(FallbackPolicy::from(fallback), FallbackPolicy::Empty);
                assert!(strict);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_export_format_arg() {
        let cli = Cli::try_parse_from([
            "promptctl",
            "export",
            "prompt.json",
            "--format",
            "langchain-chat",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export {
                format: ExportFormat::LangchainChat,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["promptctl", "export", "p.json", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["promptctl", "recent", "--verbose", "--config", "c.json"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
    }
}
