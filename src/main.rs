//! FocusPlay - focus sessions with background music
//!
//! Runs a countdown in the terminal and optionally plays a looping track or
//! a shuffled folder of MP3s. Ctrl-C pauses and saves the session so that
//! `focusplay resume` can pick it up later.

use anyhow::Result;
use clap::{CommandFactory, Parser};

use focusplay::cli::{Cli, Commands, Context, Display, ProfileCommands};
use focusplay::stats::today;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            return Ok(());
        }
        Some(command) => command,
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    let context = Context::load(cli.data_dir.as_deref())?;

    match command {
        Commands::Start(args) => {
            context.start(&args).await?;
        }
        Commands::Resume(music) => {
            context.resume(&music).await?;
        }
        Commands::Status => {
            Display::show_status(context.saved_session().as_ref());
            Display::show_stats(&context.stats()?, today());
        }
        Commands::Clear => {
            context.clear_session();
            Display::show_cleared();
        }
        Commands::Profiles { action } => match action.unwrap_or(ProfileCommands::List) {
            ProfileCommands::List => Display::show_profiles(&context.profiles()?),
            ProfileCommands::Add(args) => {
                let profile = args.to_profile();
                context.save_profile(profile.clone())?;
                Display::show_profile_saved(&profile);
            }
            ProfileCommands::Remove { id } => {
                Display::show_profile_removed(&context.remove_profile(&id)?);
            }
        },
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["focusplay"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_start_with_options() {
        let cli = Cli::parse_from(["focusplay", "start", "--minutes", "45", "--profile", "writing"]);
        match cli.command {
            Some(Commands::Start(args)) => {
                assert_eq!(args.minutes, Some(45));
                assert_eq!(args.profile, "writing");
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn test_execute_status_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let cli = Cli::parse_from(["focusplay", "--data-dir", data_dir, "status"]);
        execute(cli).await.unwrap();

        let cli = Cli::parse_from(["focusplay", "--data-dir", data_dir, "clear"]);
        execute(cli).await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let cli = Cli::parse_from([
            "focusplay", "--data-dir", data_dir, "profiles", "add", "walk", "-m", "15",
        ]);
        execute(cli).await.unwrap();

        let cli = Cli::parse_from(["focusplay", "--data-dir", data_dir, "profiles"]);
        execute(cli).await.unwrap();

        let cli = Cli::parse_from([
            "focusplay", "--data-dir", data_dir, "profiles", "remove", "walk",
        ]);
        execute(cli).await.unwrap();

        let cli = Cli::parse_from([
            "focusplay", "--data-dir", data_dir, "profiles", "remove", "walk",
        ]);
        assert!(execute(cli).await.is_err());
    }
}
