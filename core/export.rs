use crate::config::ExportOptions;
use crate::content::read_text_lossy;
use crate::error::{AppError, Result};
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file that passed every filter, in the order the walk reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// The root joined with `relative_path`, as the walk produced it.
    pub path: PathBuf,
    pub relative_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct ExportSummary {
    pub output: PathBuf,
    pub files_written: usize,
    pub read_errors: usize,
    pub files_skipped: usize,
    pub dirs_pruned: usize,
    pub bytes_written: u64,
}

#[derive(Debug, Default)]
struct WalkStats {
    files_skipped: usize,
    dirs_pruned: usize,
}

/// Runs the traversal and filter policy only. Nothing is read or written.
pub fn select_files(options: &ExportOptions) -> Result<Vec<SelectedFile>> {
    options.validate()?;
    let output_target = absolute_target(&options.output);
    let mut selected = Vec::new();
    let stats = walk_selected(options, output_target.as_deref(), |file| {
        selected.push(file);
        Ok(())
    })?;
    log::debug!(
        "Selection complete: {} selected, {} skipped, {} directories pruned",
        selected.len(),
        stats.files_skipped,
        stats.dirs_pruned
    );
    Ok(selected)
}

/// Exports the tree, printing each processed file's path on stdout.
pub fn export_tree(options: &ExportOptions) -> Result<ExportSummary> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    export_tree_with_progress(options, &mut handle)
}

/// Exports the tree, printing each processed file's path to `progress`.
///
/// The output file is truncated first. A file that cannot be read gets an
/// inline `[ERROR reading file: ...]` marker instead of its content and the
/// walk moves on; any other failure aborts the run.
pub fn export_tree_with_progress<W: Write>(
    options: &ExportOptions,
    progress: &mut W,
) -> Result<ExportSummary> {
    options.validate()?;
    log::info!(
        "Exporting {} into {}",
        options.root.display(),
        options.output.display()
    );

    let mut out = create_output(&options.output)?;
    let output_target = absolute_target(&options.output);
    let mut summary = ExportSummary {
        output: options.output.clone(),
        ..ExportSummary::default()
    };

    let stats = walk_selected(options, output_target.as_deref(), |file| {
        writeln!(progress, "{}", file.path.display())?;

        let (content, failed) = match read_text_lossy(&file.path) {
            Ok(text) => (text, false),
            Err(e) => {
                log::warn!("Could not read {}: {}", file.path.display(), e);
                (format!("[ERROR reading file: {}]\n", e), true)
            }
        };

        let written = write_block(&mut out, &file.relative_path, &content).map_err(|e| {
            AppError::FileWrite {
                path: options.output.clone(),
                source: e,
            }
        })?;

        summary.files_written += 1;
        summary.bytes_written += written;
        if failed {
            summary.read_errors += 1;
        }
        Ok(())
    })?;

    out.flush().map_err(|e| AppError::FileWrite {
        path: options.output.clone(),
        source: e,
    })?;

    summary.files_skipped = stats.files_skipped;
    summary.dirs_pruned = stats.dirs_pruned;
    log::info!(
        "Export complete: {} files written ({} unreadable), {} skipped, {} directories pruned",
        summary.files_written,
        summary.read_errors,
        summary.files_skipped,
        summary.dirs_pruned
    );
    Ok(summary)
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            log::debug!("Creating output directory {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    let file = File::create(path).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

fn write_block<W: Write>(out: &mut W, relative_path: &Path, content: &str) -> io::Result<u64> {
    let header = format!("=== {} ===\n", relative_path.display());
    out.write_all(header.as_bytes())?;
    out.write_all(content.as_bytes())?;
    out.write_all(b"\n\n")?;
    Ok((header.len() + content.len() + 2) as u64)
}

/// Walks the tree top-down and hands every file that passes the filters to
/// `visit`, in walk order.
///
/// Within a directory its files come before its subdirectories, each group
/// in directory-listing order. Pruned directories are never read.
fn walk_selected<F>(
    options: &ExportOptions,
    output_target: Option<&Path>,
    mut visit: F,
) -> Result<WalkStats>
where
    F: FnMut(SelectedFile) -> Result<()>,
{
    let root = options.root.as_path();
    let filters = &options.filters;
    let canonical_root = fs::canonicalize(root).ok();
    let mut stats = WalkStats::default();
    let mut dirs_pruned = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()))
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let pruned = filters.prunes_dir(&entry.file_name().to_string_lossy());
            if pruned {
                log::debug!("Pruning directory: {}", entry.path().display());
                dirs_pruned += 1;
            }
            !pruned
        });

    log::debug!("Walking directory: {}", root.display());
    for entry_result in walker {
        let entry = entry_result?;
        if entry.depth() == 0 || !is_file_candidate(&entry) {
            continue;
        }

        let path = entry.path();
        let dir_name = path.parent().map(base_name).unwrap_or(Cow::Borrowed(""));
        if !filters.emits_files_in(&dir_name) {
            log::trace!("Directory name not included, skipping: {}", path.display());
            stats.files_skipped += 1;
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let verdict = filters.accepts_file(&file_name);
        if !verdict.is_accepted() {
            log::trace!("Skipping {} ({:?})", path.display(), verdict);
            stats.files_skipped += 1;
            continue;
        }

        let relative_path = match pathdiff::diff_paths(path, root) {
            Some(rel) => rel,
            None => {
                log::warn!("Could not get relative path for: {}", path.display());
                path.to_path_buf()
            }
        };

        if let (Some(target), Some(canonical_root)) = (output_target, canonical_root.as_deref()) {
            if canonical_root.join(&relative_path) == target {
                log::debug!("Skipping the output file itself: {}", path.display());
                stats.files_skipped += 1;
                continue;
            }
        }

        log::trace!("Selected: {}", relative_path.display());
        visit(SelectedFile {
            path: path.to_path_buf(),
            relative_path,
        })?;
    }

    stats.dirs_pruned = dirs_pruned;
    Ok(stats)
}

/// Regular files and symlinks that do not resolve to a directory. Links to
/// directories are never followed, and other special files are left alone.
fn is_file_candidate(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if file_type.is_symlink() {
        return !fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir());
    }
    if !file_type.is_dir() {
        log::debug!("Skipping special file: {}", entry.path().display());
    }
    false
}

/// The last component of a directory path, or the path itself when it has
/// none (`.`, `..`, `/`).
fn base_name(path: &Path) -> Cow<'_, str> {
    match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => path.to_string_lossy(),
    }
}

/// Absolute location of `path`, resolved through its parent when the file
/// itself does not exist yet.
fn absolute_target(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = fs::canonicalize(path) {
        return Some(resolved);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path.file_name()?;
    fs::canonicalize(parent).ok().map(|p| p.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn run(root: &Path, options: ExportOptions) -> (String, String, ExportSummary) {
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("out.txt");
        let options = options.with_root(root).with_output(&output);
        let mut progress = Vec::new();
        let summary = export_tree_with_progress(&options, &mut progress).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        (written, String::from_utf8(progress).unwrap(), summary)
    }

    fn header(rel: &str) -> String {
        let path: PathBuf = rel.split('/').collect();
        format!("=== {} ===\n", path.display())
    }

    #[test]
    fn ignored_extension_leaves_single_block() {
        let root = tree(&[("a.txt", "hello"), ("b.log", "world")]);
        let (written, _, summary) = run(root.path(), ExportOptions::new().ignore_exts(["log"]));
        assert_eq!(written, "=== a.txt ===\nhello\n\n");
        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.bytes_written, written.len() as u64);
    }

    #[test]
    fn empty_filters_include_every_file() {
        let root = tree(&[("a.txt", "1"), ("sub/b.md", "2"), ("sub/deep/c.rs", "3")]);
        let (written, _, summary) = run(root.path(), ExportOptions::new());
        assert_eq!(summary.files_written, 3);
        assert!(written.contains(&header("a.txt")));
        assert!(written.contains(&header("sub/b.md")));
        assert!(written.contains(&header("sub/deep/c.rs")));
    }

    #[test]
    fn ignored_directories_are_pruned_with_their_subtrees() {
        let root = tree(&[
            ("keep.js", "k"),
            ("node_modules/pkg/index.js", "dep"),
            ("src/node_modules/nested.js", "dep"),
            ("src/app.js", "app"),
        ]);
        let (written, _, summary) =
            run(root.path(), ExportOptions::new().ignore_dirs(["node_modules"]));
        assert!(written.contains(&header("keep.js")));
        assert!(written.contains(&header("src/app.js")));
        assert!(!written.contains("index.js"));
        assert!(!written.contains("nested.js"));
        assert_eq!(summary.dirs_pruned, 2);
    }

    #[test]
    fn root_is_never_pruned() {
        let root = tree(&[("project/a.txt", "a")]);
        let (written, _, _) = run(
            &root.path().join("project"),
            ExportOptions::new().ignore_dirs(["project"]),
        );
        assert_eq!(written, "=== a.txt ===\na\n\n");
    }

    #[test]
    fn dir_name_include_gates_files_but_not_descent() {
        let root = tree(&[
            ("proj/top.txt", "top"),
            ("proj/templates/base.html", "base"),
            ("proj/other/skip.txt", "skip"),
            ("proj/other/templates/page.html", "page"),
        ]);
        let (written, _, _) = run(
            &root.path().join("proj"),
            ExportOptions::new().dir_name_includes(["templ"]),
        );
        assert!(!written.contains("top.txt"));
        assert!(!written.contains("skip.txt"));
        assert!(written.contains(&header("templates/base.html")));
        assert!(written.contains(&header("other/templates/page.html")));
    }

    #[test]
    fn dir_name_include_checks_the_root_name() {
        let root = tree(&[("templates/a.html", "a")]);
        let (written, _, _) = run(
            &root.path().join("templates"),
            ExportOptions::new().dir_name_includes(["templates"]),
        );
        assert_eq!(written, "=== a.html ===\na\n\n");
    }

    #[test]
    fn exclude_wins_over_include() {
        let root = tree(&[("filter.py", "f"), ("filter_ttd.py", "t"), ("main.py", "m")]);
        let (written, _, _) = run(
            root.path(),
            ExportOptions::new()
                .file_name_includes(["filter"])
                .exclude_files(["ttd"]),
        );
        assert_eq!(written, "=== filter.py ===\nf\n\n");
    }

    #[test]
    fn files_come_before_subdirectories() {
        let root = tree(&[("a/inner.txt", "inner"), ("z.txt", "outer")]);
        let (written, _, _) = run(root.path(), ExportOptions::new());
        let outer = written.find(&header("z.txt")).unwrap();
        let inner = written.find(&header("a/inner.txt")).unwrap();
        assert!(outer < inner, "{}", written);
    }

    #[test]
    fn progress_lists_full_paths() {
        let root = tree(&[("a.txt", "a"), ("sub/b.txt", "b")]);
        let (_, progress, _) = run(root.path(), ExportOptions::new());
        let lines: Vec<&str> = progress.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], root.path().join("a.txt").display().to_string());
        assert_eq!(
            lines[1],
            root.path().join("sub").join("b.txt").display().to_string()
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_gets_inline_marker() {
        let root = tree(&[("a.txt", "a"), ("z.txt", "z")]);
        std::os::unix::fs::symlink(root.path().join("gone.txt"), root.path().join("m.txt"))
            .unwrap();
        let (written, _, summary) = run(root.path(), ExportOptions::new());
        assert!(written.contains("=== m.txt ===\n[ERROR reading file: "), "{}", written);
        assert!(written.contains("=== a.txt ===\na\n\n"));
        assert!(written.contains("=== z.txt ===\nz\n\n"));
        assert_eq!(summary.files_written, 3);
        assert_eq!(summary.read_errors, 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let root = tree(&[("real/a.txt", "a")]);
        std::os::unix::fs::symlink(root.path().join("real"), root.path().join("link")).unwrap();
        let (written, _, _) = run(root.path(), ExportOptions::new());
        assert_eq!(written, format!("{}a\n\n", header("real/a.txt")));
    }

    #[test]
    fn rerun_overwrites_output() {
        let root = tree(&[("a.txt", "hello")]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("out.txt");
        let options = ExportOptions::new().with_root(root.path()).with_output(&output);

        export_tree_with_progress(&options, &mut io::sink()).unwrap();
        export_tree_with_progress(&options, &mut io::sink()).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "=== a.txt ===\nhello\n\n");
    }

    #[test]
    fn output_inside_root_is_not_exported() {
        let root = tree(&[("a.txt", "hello")]);
        let output = root.path().join("all_code.txt");
        let options = ExportOptions::new().with_root(root.path()).with_output(&output);

        export_tree_with_progress(&options, &mut io::sink()).unwrap();
        export_tree_with_progress(&options, &mut io::sink()).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "=== a.txt ===\nhello\n\n");
    }

    #[test]
    fn output_parent_directories_are_created() {
        let root = tree(&[("a.txt", "hello")]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("nested").join("dump.txt");
        let options = ExportOptions::new().with_root(root.path()).with_output(&output);
        export_tree_with_progress(&options, &mut io::sink()).unwrap();
        assert!(output.is_file());
    }

    #[test]
    fn invalid_root_aborts_before_writing() {
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("out.txt");
        let options = ExportOptions::new()
            .with_root(out_dir.path().join("missing"))
            .with_output(&output);
        let err = export_tree_with_progress(&options, &mut io::sink()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRoot { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn select_files_writes_nothing() {
        let root = tree(&[("a.txt", "a"), ("b.log", "b"), ("sub/c.txt", "c")]);
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("out.txt");
        let options = ExportOptions::new()
            .with_root(root.path())
            .with_output(&output)
            .ignore_exts(["log"]);
        let selected = select_files(&options).unwrap();
        let relative: Vec<PathBuf> = selected.into_iter().map(|f| f.relative_path).collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("a.txt"), Path::new("sub").join("c.txt")]
        );
        assert!(!output.exists());
    }

    #[test]
    fn base_name_falls_back_to_whole_path() {
        assert_eq!(base_name(Path::new("src/templates")), "templates");
        assert_eq!(base_name(Path::new(".")), ".");
    }
}
