use clap::{Args, Parser};
use echotree_core::{DEFAULT_OUTPUT_FILE, DEFAULT_ROOT};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Concatenate the text files of a directory tree into one annotated document.",
    long_about = "echotree walks a directory tree top-down, prunes ignored directories, filters files \nby extension and name, and writes every remaining file into a single output file, \neach block headed by '=== <relative path> ==='.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  echotree src -e json,svg,png -d node_modules,.git\n  echotree . -o review.txt -i filter -x test\n  echotree backend --dir-include templates --dry-run"
)]
pub struct Cli {
    #[arg(
        value_name = "ROOT",
        default_value = DEFAULT_ROOT,
        help = "Directory to export."
    )]
    pub root: String,

    #[arg(
        short = 'o',
        long,
        value_name = "PATH",
        default_value = DEFAULT_OUTPUT_FILE,
        help = "Output file, truncated on every run.",
        help_heading = "Output Control"
    )]
    pub output: String,

    #[clap(flatten)]
    pub filters: FilterGroup,

    #[arg(
        long,
        help = "Only list the files that would be exported; write nothing.",
        help_heading = "Output Control"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        help = "Print the run summary (or the dry-run selection) as JSON.",
        help_heading = "Output Control"
    )]
    pub json_summary: bool,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase log verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence progress lines, the summary and warnings."
    )]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterGroup {
    #[arg(short = 'e', long = "ignore-ext", value_name = "EXT", value_delimiter = ',', action = clap::ArgAction::Append, help = "Skip files ending in '.EXT' (repeatable, comma-separated).", help_heading = "Filtering")]
    pub ignore_exts: Vec<String>,

    #[arg(short = 'd', long = "ignore-dir", value_name = "NAME", value_delimiter = ',', action = clap::ArgAction::Append, help = "Never descend into directories named exactly NAME.", help_heading = "Filtering")]
    pub ignore_dirs: Vec<String>,

    #[arg(long = "dir-include", value_name = "SUBSTR", value_delimiter = ',', action = clap::ArgAction::Append, help = "Only emit files from directories whose name contains SUBSTR.", help_heading = "Filtering")]
    pub dir_name_includes: Vec<String>,

    #[arg(short = 'i', long = "include", value_name = "SUBSTR", value_delimiter = ',', action = clap::ArgAction::Append, help = "Only emit files whose name contains SUBSTR.", help_heading = "Filtering")]
    pub file_name_includes: Vec<String>,

    #[arg(short = 'x', long = "exclude", value_name = "SUBSTR", value_delimiter = ',', action = clap::ArgAction::Append, help = "Skip files whose name contains SUBSTR.", help_heading = "Filtering")]
    pub exclude_files: Vec<String>,
}
