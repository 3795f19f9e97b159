mod cli_args;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io;
use std::path::PathBuf;
use std::process;

use cli_args::Cli;
use echotree_core::{AppError, ExportOptions, Filters};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::InvalidRoot { .. }) => 2,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirCreation { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(_) => 1,
                None => 1,
            };

            // Printed even under --quiet, where logging is off.
            eprintln!("{} {:#}", "Error:".red().bold(), e);

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli) -> Result<()> {
    let options = build_options(&cli);
    log::debug!("Effective options: {:?}", options);

    if cli.dry_run {
        let selected = echotree_core::select_files(&options)
            .with_context(|| format!("Failed to scan {}", options.root.display()))?;
        return output::print_selection(&selected, cli.json_summary);
    }

    // Progress lines share stdout with the JSON summary, so keep it clean.
    let summary = if cli.quiet || cli.json_summary {
        echotree_core::export_tree_with_progress(&options, &mut io::sink())
    } else {
        echotree_core::export_tree(&options)
    }
    .with_context(|| {
        format!(
            "Failed to export {} into {}",
            options.root.display(),
            options.output.display()
        )
    })?;

    if cli.json_summary {
        output::print_summary_json(&summary)
    } else {
        if !cli.quiet {
            output::print_summary(&summary);
        }
        Ok(())
    }
}

fn build_options(cli: &Cli) -> ExportOptions {
    let filters = Filters {
        ignore_exts: cli.filters.ignore_exts.clone(),
        ignore_dirs: cli.filters.ignore_dirs.clone(),
        dir_name_includes: cli.filters.dir_name_includes.clone(),
        file_name_includes: cli.filters.file_name_includes.clone(),
        exclude_files: cli.filters.exclude_files.clone(),
    };
    ExportOptions::new()
        .with_root(expand_path(&cli.root))
        .with_output(expand_path(&cli.output))
        .with_filters(filters)
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}
