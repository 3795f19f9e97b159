//! Name-based filter policy applied while walking the tree.
//!
//! All matching is plain, case-sensitive string matching on a single path
//! component (a directory name or a file name). Nothing here touches the
//! filesystem.

/// The five filter lists of an export. Every list defaults to a fresh, empty
/// vector, and an empty list never filters anything out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Extensions (without the leading dot) whose files are skipped.
    pub ignore_exts: Vec<String>,
    /// Directory names that are pruned from the walk, subtree included.
    pub ignore_dirs: Vec<String>,
    /// A directory only emits its own files if its name contains one of these.
    pub dir_name_includes: Vec<String>,
    /// A file is only emitted if its name contains one of these.
    pub file_name_includes: Vec<String>,
    /// A file is skipped if its name contains any of these.
    pub exclude_files: Vec<String>,
}

/// Outcome of running a file name through [`Filters::accepts_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVerdict {
    Accepted,
    IgnoredExtension,
    Excluded,
    NotIncluded,
}

impl FileVerdict {
    pub fn is_accepted(self) -> bool {
        self == FileVerdict::Accepted
    }
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a subdirectory with this exact name must not be descended into.
    pub fn prunes_dir(&self, dir_name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == dir_name)
    }

    /// True if files sitting directly in a directory with this base name may
    /// be emitted. Does not affect descent into its children.
    pub fn emits_files_in(&self, dir_name: &str) -> bool {
        contains_any_or_empty(dir_name, &self.dir_name_includes)
    }

    /// Checks a file name against extension, exclude and include rules, in
    /// that order. The first failing rule decides the verdict.
    pub fn accepts_file(&self, file_name: &str) -> FileVerdict {
        if has_ignored_extension(file_name, &self.ignore_exts) {
            return FileVerdict::IgnoredExtension;
        }
        if contains_any(file_name, &self.exclude_files) {
            return FileVerdict::Excluded;
        }
        if !contains_any_or_empty(file_name, &self.file_name_includes) {
            return FileVerdict::NotIncluded;
        }
        FileVerdict::Accepted
    }
}

fn has_ignored_extension(file_name: &str, exts: &[String]) -> bool {
    exts.iter().any(|ext| {
        file_name
            .strip_suffix(ext.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

fn contains_any(name: &str, substrings: &[String]) -> bool {
    substrings.iter().any(|s| name.contains(s.as_str()))
}

fn contains_any_or_empty(name: &str, substrings: &[String]) -> bool {
    substrings.is_empty() || contains_any(name, substrings)
}
