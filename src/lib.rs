//! dupefind - content-based duplicate file finder
//!
//! Files are grouped by content in three filter stages (size, a 1 KiB
//! partial BLAKE3 digest, then the full digest). Results are exhaustive
//! per-file tables or equivalence classes, two folders can be compared by
//! content, and redundant copies can be removed after every file is
//! re-hashed.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{delete_duplicates, DeleteConfig, DeleteError, DeleteProgressCallback};
use crate::cli::{
    Cli, Commands, CompareArgs, DeleteArgs, FindArgs, HashArgs, ListArgs, OutputArgs,
    OutputFormat, ScanArgs,
};
use crate::config::Config;
use crate::duplicates::{
    compare_folders, duplicates_only, find_copies_of, list_all, DuplicateFinder, FinderConfig,
    ResultTable,
};
use crate::error::ExitCode;
use crate::output::{
    read_file_column, read_table, resolve_csv_path, write_classes, write_json, write_table,
    write_table_text, write_table_to_path, JsonOutput, JsonTable,
};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;
use crate::signal::ShutdownHandler;

/// Run one command line to completion.
///
/// # Errors
///
/// Returns an error for invalid inputs, I/O failures while writing results,
/// and [`duplicates::FinderError::Interrupted`] when a scan is cancelled.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load();
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler()?;
    let show_progress = !cli.quiet && !cli.no_progress;
    let app = App {
        config,
        handler,
        show_progress,
    };

    match cli.command {
        Commands::Scan(args) => app.scan(&args),
        Commands::Compare(args) => app.compare(&args),
        Commands::Find(args) => app.find(&args),
        Commands::List(args) => app.list(&args),
        Commands::Delete(args) => app.delete(&args, &mut io::stdin().lock()),
    }
}

struct App {
    config: Config,
    handler: ShutdownHandler,
    show_progress: bool,
}

impl App {
    fn finder_config(&self, hash: &HashArgs) -> FinderConfig {
        let io_threads = hash
            .io_threads
            .map_or(self.config.io_threads, usize::from);
        let walker = WalkerConfig::new(hash.extension.clone(), self.config.skip_names.clone());

        let mut config = FinderConfig::default()
            .with_io_threads(io_threads)
            .with_walker_config(walker)
            .with_shutdown_flag(self.handler.get_flag());
        if self.show_progress {
            config = config.with_progress_callback(Arc::new(Progress::new(false)));
        }
        config
    }

    fn scan(&self, args: &ScanArgs) -> Result<ExitCode> {
        let config = self.finder_config(&args.hash);

        if let [root] = args.paths.as_slice() {
            let fast_scan = args.fast_scan || self.config.fast_scan;
            let table = list_all(root, &config, fast_scan)?;
            let unreadable = table.unreadable_count();
            let found = table.class_count() > 0;
            let shown = if args.all { table } else { duplicates_only(&table) };

            log::info!(
                "{} duplicate group(s) under {}",
                shown.class_count(),
                root.display()
            );
            self.emit_table(&shown, &args.out)?;
            return Ok(ExitCode::for_outcome(found, unreadable));
        }

        if args.all || args.fast_scan {
            bail!("--all and --fast-scan apply to a single folder; pass one FOLDER to use them");
        }

        let finder = DuplicateFinder::new(config);
        let (classes, summary) = finder.find_in_paths(&args.paths)?;
        if summary.interrupted {
            return Err(duplicates::FinderError::Interrupted.into());
        }

        log::info!(
            "{} duplicate group(s), {} reclaimable, {} of {} files skipped",
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.skipped_files(),
            summary.total_files
        );
        let exit_code = ExitCode::for_outcome(!classes.is_empty(), summary.skipped_files());

        let stdout = io::stdout();
        let mut out = stdout.lock();
        match args.out.output {
            OutputFormat::Table => write_classes(&classes, &mut out)?,
            OutputFormat::Json => {
                write_json(&JsonOutput::new(&classes, &summary, exit_code), &mut out, true)?;
            }
            OutputFormat::Csv => write_table(&ResultTable::from_classes(&classes), &mut out)?,
        }
        drop(out);

        if args.out.saves_csv() {
            self.save_csv(&ResultTable::from_classes(&classes), &args.out)?;
        }
        Ok(exit_code)
    }

    fn compare(&self, args: &CompareArgs) -> Result<ExitCode> {
        let config = self.finder_config(&args.hash);
        let found = compare_folders(&args.reference, &args.candidate, &config)?;
        self.emit_table(&found.table, &args.out)?;
        Ok(ExitCode::for_outcome(!found.table.is_empty(), found.unreadable))
    }

    fn find(&self, args: &FindArgs) -> Result<ExitCode> {
        let config = self.finder_config(&args.hash);
        let copies = find_copies_of(&args.file, &args.folder, &config)?;
        self.emit_table(&copies.table, &args.out)?;
        Ok(ExitCode::for_outcome(!copies.table.is_empty(), copies.unreadable))
    }

    fn list(&self, args: &ListArgs) -> Result<ExitCode> {
        let table = read_table(&args.csv_file)?;
        write_output(&table, args.output)?;
        Ok(ExitCode::for_outcome(
            table.class_count() > 0,
            table.unreadable_count(),
        ))
    }

    fn delete(&self, args: &DeleteArgs, input: &mut impl BufRead) -> Result<ExitCode> {
        let paths = read_file_column(&args.csv_file)?;
        if paths.is_empty() {
            log::info!("No files listed in {}", args.csv_file.display());
            return Ok(ExitCode::NoDuplicates);
        }

        if !args.dry_run && !args.yes && !confirm(&paths, input, &mut io::stderr())? {
            log::info!("Deletion cancelled");
            return Ok(ExitCode::NoDuplicates);
        }

        let io_threads = args
            .io_threads
            .map_or(self.config.io_threads, usize::from);
        let config = DeleteConfig::default()
            .with_dry_run(args.dry_run)
            .with_io_threads(io_threads)
            .with_shutdown_flag(self.handler.get_flag());

        let reporter = ConsoleDeleteReporter {
            dry_run: args.dry_run,
        };
        let report = delete_duplicates(&paths, &config, Some(&reporter));
        eprintln!("{}", report.summary());

        let code = if report.interrupted {
            ExitCode::Interrupted
        } else if report.failure_count() > 0 {
            ExitCode::PartialSuccess
        } else if report.deleted_count() > 0 {
            ExitCode::Success
        } else {
            ExitCode::NoDuplicates
        };
        Ok(code)
    }

    fn emit_table(&self, table: &ResultTable, out: &OutputArgs) -> Result<()> {
        write_output(table, out.output)?;
        if out.saves_csv() {
            self.save_csv(table, out)?;
        }
        Ok(())
    }

    fn save_csv(&self, table: &ResultTable, out: &OutputArgs) -> Result<PathBuf> {
        let directory = out.csv_path.as_deref().unwrap_or_else(|| Path::new("."));
        let filename = out
            .csv_filename
            .as_deref()
            .unwrap_or(self.config.csv_filename.as_str());

        let path = resolve_csv_path(directory, filename)?;
        write_table_to_path(table, &path)?;
        log::info!("Saved {} row(s) to {}", table.len(), path.display());
        Ok(path)
    }
}

fn write_output(table: &ResultTable, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Table => write_table_text(table, &mut out)?,
        OutputFormat::Json => write_json(&JsonTable::new(table), &mut out, true)?,
        OutputFormat::Csv => write_table(table, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn confirm(paths: &[PathBuf], input: &mut impl BufRead, prompt: &mut impl Write) -> Result<bool> {
    write!(
        prompt,
        "Re-hash {} listed file(s) and delete every repeated copy? [y/N] ",
        paths.len()
    )?;
    prompt.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

struct ConsoleDeleteReporter {
    dry_run: bool,
}

impl DeleteProgressCallback for ConsoleDeleteReporter {
    fn on_delete_success(&self, path: &Path, _size: u64) {
        if self.dry_run {
            println!("Would delete: {}", path.display());
        } else {
            println!("Deleted: {}", path.display());
        }
    }

    fn on_delete_failure(&self, path: &Path, error: &DeleteError) {
        eprintln!(
            "Error occurred while deleting file {}: {}",
            path.display(),
            error
        );
    }
}
