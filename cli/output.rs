use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use echotree_core::{ExportSummary, SelectedFile};
use std::io::{self, Write};

pub fn print_summary(summary: &ExportSummary) {
    let size = Byte::from_u128(summary.bytes_written as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string();

    println!();
    println!(
        "{} Exported {} files ({}) to: {}",
        "✅".green(),
        summary.files_written.to_string().cyan(),
        size.cyan(),
        summary.output.display().to_string().blue()
    );
    if summary.read_errors > 0 {
        println!(
            "{} {} files could not be read; see the [ERROR reading file: ...] markers.",
            "⚠️".yellow(),
            summary.read_errors.to_string().yellow()
        );
    }
    log::info!(
        "{} files skipped by filters, {} directories pruned",
        summary.files_skipped,
        summary.dirs_pruned
    );
}

pub fn print_summary_json(summary: &ExportSummary) -> Result<()> {
    let content =
        serde_json::to_string_pretty(summary).context("Failed to serialize export summary")?;
    write_to_stdout(&content)
}

pub fn print_selection(selected: &[SelectedFile], as_json: bool) -> Result<()> {
    if as_json {
        let paths: Vec<String> = selected
            .iter()
            .map(|f| f.relative_path.to_string_lossy().into_owned())
            .collect();
        let content =
            serde_json::to_string_pretty(&paths).context("Failed to serialize file selection")?;
        return write_to_stdout(&content);
    }

    let mut content = String::new();
    for file in selected {
        content.push_str(&file.path.display().to_string());
        content.push('\n');
    }
    write_to_stdout(&content)
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.is_empty() && !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
