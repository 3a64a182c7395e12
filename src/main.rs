use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use casegen::cli::{self, Overrides};

#[derive(Parser)]
#[command(name = "casegen", version)]
#[command(about = "Confirm a snippet's language and draft test cases for it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (defaults to ./casegen.toml or ~/.config/casegen/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override the model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    /// Override the sampling temperature
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Use an offline mock model instead of the completion service
    #[arg(long, global = true)]
    dry_run: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the language of a snippet and generate test cases once
    Generate {
        /// Declared programming language (e.g., Python, JavaScript)
        #[arg(short, long)]
        language: String,

        /// Code passed inline
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// File containing the code ("-" for stdin; stdin when neither is given)
        #[arg(short, long)]
        file: Option<String>,

        /// Number of test cases to keep (default: from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fill in the form repeatedly on the terminal
    Interactive,

    /// Show the resolved configuration and what is missing for a live run
    ConfigCheck {
        /// Also fetch one access token to prove the credentials
        #[arg(long)]
        auth: bool,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let overrides = Overrides {
        model: cli.model,
        temperature: cli.temperature,
    };

    match cli.command {
        Commands::Generate {
            language,
            code,
            file,
            count,
            output,
        } => {
            cli::generate::run(
                language,
                code,
                file,
                count,
                output,
                cli.config,
                overrides,
                cli.dry_run,
            )
            .await?;
        }
        Commands::Interactive => {
            cli::interactive::run(cli.config, overrides, cli.dry_run).await?;
        }
        Commands::ConfigCheck { auth } => {
            cli::config_check::run(cli.config, overrides, auth).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "casegen", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_defaults() {
        let cli = Cli::try_parse_from(["casegen", "generate", "--language", "python"]).unwrap();
        assert!(!cli.dry_run);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Generate {
                language,
                code,
                file,
                count,
                output,
            } => {
                assert_eq!(language, "python");
                assert!(code.is_none());
                assert!(file.is_none());
                assert!(count.is_none());
                assert!(output.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_generate_with_all_args() {
        let cli = Cli::try_parse_from([
            "casegen",
            "generate",
            "-l",
            "Rust",
            "--file",
            "src/lib.rs",
            "-n",
            "5",
            "-o",
            "cases.md",
            "--model",
            "gpt-4o",
            "--temperature",
            "0.3",
            "--dry-run",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.temperature, Some(0.3));
        match cli.command {
            Commands::Generate {
                language,
                file,
                count,
                output,
                ..
            } => {
                assert_eq!(language, "Rust");
                assert_eq!(file.as_deref(), Some("src/lib.rs"));
                assert_eq!(count, Some(5));
                assert_eq!(output.as_deref(), Some("cases.md"));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_code_and_file_conflict() {
        let result = Cli::try_parse_from([
            "casegen", "generate", "-l", "go", "--code", "x", "--file", "a.go",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_generate_requires_language() {
        assert!(Cli::try_parse_from(["casegen", "generate"]).is_err());
    }

    #[test]
    fn test_parse_global_flags_before_subcommand() {
        let cli =
            Cli::try_parse_from(["casegen", "--config", "my.toml", "--dry-run", "interactive"])
                .unwrap();
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Commands::Interactive));
    }

    #[test]
    fn test_parse_config_check() {
        let cli = Cli::try_parse_from(["casegen", "config-check", "--auth"]).unwrap();
        assert!(matches!(cli.command, Commands::ConfigCheck { auth: true }));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["casegen", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Bash }));
    }

    #[test]
    fn test_parse_missing_subcommand() {
        assert!(Cli::try_parse_from(["casegen"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
