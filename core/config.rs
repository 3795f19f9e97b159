use crate::error::{AppError, Result};
use crate::filters::Filters;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = ".";
pub const DEFAULT_OUTPUT_FILE: &str = "all_code.txt";

/// Everything one export run needs. Built once per invocation and only
/// borrowed while the export runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub root: PathBuf,
    pub output: PathBuf,
    pub filters: Filters,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            filters: Filters::new(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn ignore_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.ignore_exts = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignore_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.ignore_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn dir_name_includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.dir_name_includes = includes.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_name_includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.file_name_includes = includes.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_files<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.exclude_files = excludes.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the parts of the options that can be rejected before any I/O
    /// against the output happens.
    pub fn validate(&self) -> Result<()> {
        if self.output.as_os_str().is_empty() {
            return Err(AppError::InvalidArgument(
                "Output path must not be empty".to_string(),
            ));
        }
        validate_root(&self.root)
    }
}

fn validate_root(root: &Path) -> Result<()> {
    match root.metadata() {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(AppError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "is not a directory".to_string(),
        }),
        Err(e) => Err(AppError::InvalidRoot {
            path: root.to_path_buf(),
            reason: format!("cannot be accessed: {}", e),
        }),
    }
}
