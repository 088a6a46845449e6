use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use trashbin_core::prelude::*;
use trashbin_core::{render_listing, sanitize_user_path, VERSION};

/// Safer removal of files and directories.
///
/// Paths given on the command line are moved into a trash bin from which they
/// can be listed, restored or permanently shredded.
#[derive(Parser, Debug)]
#[command(name = "trash", disable_version_flag = true)]
struct Cli {
    /// List contents of trash bin.
    #[arg(long)]
    list: bool,

    /// Restore a file from trash bin.
    #[arg(long)]
    restore: bool,

    /// Empty the trash bin.
    #[arg(long)]
    empty: bool,

    /// Check that the metadata log and the trash directory agree.
    #[arg(long)]
    check: bool,

    /// Enable verbose logging.
    #[arg(long, default_value_t = false)]
    verbose: bool,

    /// Print version.
    #[arg(short = 'v', long)]
    version: bool,

    /// Paths to files or directories to move to trash.
    paths: Vec<PathBuf>,
}

impl Cli {
    /// First requested operation, in the order list, restore, empty, check, paths.
    fn command_kind(&self) -> Option<CommandKind> {
        if self.list {
            Some(CommandKind::List)
        } else if self.restore {
            Some(CommandKind::Restore)
        } else if self.empty {
            Some(CommandKind::Purge)
        } else if self.check {
            Some(CommandKind::Audit)
        } else if !self.paths.is_empty() {
            Some(CommandKind::Admit)
        } else {
            None
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(io::stderr)
        .init();
}

fn admit(bin: &TrashBin, paths: &[PathBuf]) -> Result<ExitStatusLike> {
    let report = bin.admit(paths)?;
    println!("trash: moved {} item(s) to trash bin.", report.moved());
    Ok(ExitStatusLike::Ok)
}

fn list(bin: &TrashBin) -> Result<ExitStatusLike> {
    let entries = bin.list()?;
    if entries.is_empty() {
        println!("trash: Trash bin is empty.");
    } else {
        render_listing(&mut io::stdout().lock(), &entries)
            .map_err(|err| CoreError::io("<stdout>", err))?;
    }
    Ok(ExitStatusLike::Ok)
}

fn restore(bin: &TrashBin) -> Result<ExitStatusLike> {
    match bin.restore(&mut ConsolePrompt::stdio())? {
        RestoreOutcome::Empty => println!("trash: Trash bin is empty."),
        RestoreOutcome::Restored(entry) => {
            println!("trash: '{}' has been restored.", entry.file_name())
        }
    }
    Ok(ExitStatusLike::Ok)
}

fn purge(bin: &TrashBin) -> Result<ExitStatusLike> {
    match bin.purge(&mut ConsolePrompt::stdio())? {
        PurgeOutcome::Empty => println!("trash: Trash bin is empty."),
        PurgeOutcome::Shredded(count) => println!("trash: {count} item(s) shredded."),
    }
    Ok(ExitStatusLike::Ok)
}

fn audit(bin: &TrashBin) -> Result<ExitStatusLike> {
    let report = bin.audit()?;
    if report.is_consistent() {
        println!("trash: metadata log and trash directory agree.");
        return Ok(ExitStatusLike::Ok);
    }

    for entry in &report.missing_objects {
        println!(
            "missing object: {} (from {})",
            entry.identifier,
            entry.original_path.display()
        );
    }
    for name in &report.orphan_objects {
        println!("orphan object: {name}");
    }
    Ok(ExitStatusLike::Warning)
}

fn report_error(err: &CoreError) -> ExitStatusLike {
    match err {
        CoreError::UserAborted => println!("trash: {err}"),
        CoreError::PathNotFound { path, moved } => {
            eprintln!("trash: '{}' does not exist.", sanitize_user_path(path));
            if *moved > 0 {
                eprintln!("trash: {moved} item(s) were already moved to trash bin.");
            }
        }
        _ => {
            eprintln!("trash: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
        }
    }
    err.exit_status()
}

fn run(cli: &Cli) -> ExitStatusLike {
    if cli.version {
        println!("Trashbin (trash) Version: {VERSION}");
        return ExitStatusLike::Ok;
    }

    let Some(kind) = cli.command_kind() else {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("trash: failed to print usage: {err}");
            return ExitStatusLike::Error;
        }
        return ExitStatusLike::Ok;
    };

    let environ: HashMap<String, String> = env::vars().collect();
    let bin = match TrashConfig::from_environ(&environ) {
        Ok(config) => TrashBin::open(config),
        Err(err) => return report_error(&err),
    };
    if let Err(err) = bin.setup() {
        return report_error(&err);
    }

    tracing::debug!(command = %kind, "dispatching");
    let result = match kind {
        CommandKind::Admit => admit(&bin, &cli.paths),
        CommandKind::List => list(&bin),
        CommandKind::Restore => restore(&bin),
        CommandKind::Purge => purge(&bin),
        CommandKind::Audit => audit(&bin),
    };

    match result {
        Ok(status) => status,
        Err(err) => report_error(&err),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    std::process::exit(run(&cli).as_code().into());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("trash").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn paths_mean_admit() {
        let cli = parse(&["a.txt", "dir/"]);
        assert_eq!(cli.command_kind(), Some(CommandKind::Admit));
        assert_eq!(cli.paths, vec![PathBuf::from("a.txt"), PathBuf::from("dir/")]);
    }

    #[test]
    fn flags_select_operations() {
        assert_eq!(parse(&["--list"]).command_kind(), Some(CommandKind::List));
        assert_eq!(parse(&["--restore"]).command_kind(), Some(CommandKind::Restore));
        assert_eq!(parse(&["--empty"]).command_kind(), Some(CommandKind::Purge));
        assert_eq!(parse(&["--check"]).command_kind(), Some(CommandKind::Audit));
    }

    #[test]
    fn list_wins_over_other_requests() {
        let cli = parse(&["--empty", "--list", "file"]);
        assert_eq!(cli.command_kind(), Some(CommandKind::List));
        assert_eq!(parse(&["--empty", "--restore"]).command_kind(), Some(CommandKind::Restore));
    }

    #[test]
    fn no_arguments_means_usage() {
        assert_eq!(parse(&[]).command_kind(), None);
    }

    #[test]
    fn short_v_is_version() {
        assert!(parse(&["-v"]).version);
        assert!(parse(&["--version"]).version);
        assert!(!parse(&["--verbose"]).version);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["trash", "--shred"]).is_err());
    }
}
