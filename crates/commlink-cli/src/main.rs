//! # Commlink CLI Entry Point
//!
//! Drives message-passing command scripts against an in-process local
//! group.
//!
//! ## Usage
//!
//! ```bash
//! # Two ranks: scripts pair up point-to-point traffic by position
//! commlink run sender.cmds receiver.cmds
//!
//! # Same command sequence on four ranks
//! commlink eval --ranks 4 -c init -c barrier -c rank -c finalize
//! ```
//!
//! Every executed command prints one JSON object on stdout, tagged with
//! the rank that ran it, so output can be piped into `jq` and friends.

use anyhow::Result;
use argh::FromArgs;

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// Commlink - scripted message passing over a local group
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Run(RunArgs),
    Eval(EvalArgs),
}

/// Arguments for running one script file per rank.
///
/// The group size equals the number of script files; the script at
/// position `i` runs as rank `i`. Point-to-point commands in different
/// scripts pair up against each other, so a `send` in one script needs
/// a matching `recv` in its peer.
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
/// run one command script per rank
struct RunArgs {
    /// script files, one per rank, rank assigned by position
    #[argh(positional)]
    scripts: Vec<String>,

    /// suppress logging and per-command output, report only failures
    #[argh(switch, short = 'q')]
    quiet: bool,
}

/// Arguments for evaluating one command sequence on every rank.
///
/// Useful for smoke tests of the collective surface: every rank runs
/// the same commands, so only rank-independent scripts make sense here
/// (`send`/`recv` would need per-rank peers).
#[derive(FromArgs)]
#[argh(subcommand, name = "eval")]
/// run the same commands on every rank
struct EvalArgs {
    /// a command line to execute; repeat to run a sequence
    #[argh(option, short = 'c', long = "command")]
    commands: Vec<String>,

    /// number of ranks in the local group
    #[argh(option, short = 'n', long = "ranks", default = "1")]
    ranks: usize,

    /// suppress logging and per-command output, report only failures
    #[argh(switch, short = 'q')]
    quiet: bool,
}

fn init_tracing() {
    // Default log level is INFO; RUST_LOG overrides.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    let replies = match cli.command {
        Commands::Run(args) => {
            if !args.quiet {
                init_tracing();
            }
            if args.scripts.is_empty() {
                return Err(anyhow::anyhow!("run needs at least one script file"));
            }
            commlink_cli::driver::run_script_files(&args.scripts, args.quiet)?
        }
        Commands::Eval(args) => {
            if !args.quiet {
                init_tracing();
            }
            if args.commands.is_empty() {
                return Err(anyhow::anyhow!("eval needs at least one -c command"));
            }
            commlink_cli::driver::eval_on_ranks(&args.commands, args.ranks, args.quiet)?
        }
    };

    let failures = commlink_cli::driver::failure_count(&replies);
    if failures > 0 {
        Err(anyhow::anyhow!("{failures} command(s) failed"))
    } else {
        Ok(())
    }
}

/// CLI argument parsing tests.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli: Cli = Cli::from_args(&["commlink"], &["run", "a.cmds", "b.cmds"]).unwrap();
        match cli.command {
            Commands::Run(RunArgs { scripts, quiet }) => {
                assert_eq!(scripts, vec!["a.cmds".to_string(), "b.cmds".to_string()]);
                assert!(!quiet);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_quiet() {
        let cli: Cli = Cli::from_args(&["commlink"], &["run", "-q", "a.cmds"]).unwrap();
        match cli.command {
            Commands::Run(RunArgs { quiet, .. }) => assert!(quiet),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_eval() {
        let cli: Cli = Cli::from_args(
            &["commlink"],
            &["eval", "--ranks", "3", "-c", "init", "-c", "barrier"],
        )
        .unwrap();
        match cli.command {
            Commands::Eval(EvalArgs {
                commands, ranks, ..
            }) => {
                assert_eq!(ranks, 3);
                assert_eq!(commands, vec!["init".to_string(), "barrier".to_string()]);
            }
            _ => panic!("Expected Eval command"),
        }
    }

    #[test]
    fn test_cli_parse_eval_default_ranks() {
        let cli: Cli = Cli::from_args(&["commlink"], &["eval", "-c", "init"]).unwrap();
        match cli.command {
            Commands::Eval(EvalArgs { ranks, .. }) => assert_eq!(ranks, 1),
            _ => panic!("Expected Eval command"),
        }
    }
}
