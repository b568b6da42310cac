use crate::output::OutputFormat;
use crate::ranking::RankCriterion;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Log engine progress at info level
    #[clap(long, global = true, value_parser, default_value_t = false)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[clap(long, global = true, value_parser)]
    pub log: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[clap(long, global = true, value_parser)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search file contents for a literal string
    Search {
        query: String,

        #[clap(default_value = ".")]
        path: PathBuf,

        /// Extensions to scan, e.g. `txt,md`
        #[clap(short, long, value_parser, use_value_delimiter = true)]
        extensions: Option<Vec<String>>,

        #[clap(short = 's', long, value_parser, default_value_t = false)]
        case_sensitive: bool,

        #[clap(long, value_enum)]
        sort: Option<RankCriterion>,

        /// Lines shown before and after each matched line
        #[clap(short = 'C', long, value_parser)]
        context_lines: Option<usize>,

        /// Skip files larger than this many MB
        #[clap(long, value_parser)]
        max_size: Option<u64>,

        #[clap(short = 'j', long, value_parser)]
        threads: Option<usize>,

        /// Skip dot-prefixed files and directories
        #[clap(long, value_parser, default_value_t = false)]
        no_hidden: bool,

        /// Honour .gitignore and .ignore files
        #[clap(long, value_parser, default_value_t = false)]
        respect_ignore: bool,

        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print search counters to stderr when done
        #[clap(long, value_parser, default_value_t = false)]
        stats: bool,
    },
    /// List the files a search would scan
    Scan {
        #[clap(default_value = ".")]
        path: PathBuf,

        #[clap(short, long, value_parser, use_value_delimiter = true)]
        extensions: Option<Vec<String>>,
    },
    /// Show the start of a file
    Preview { file: PathBuf },
    /// Generate shell completions
    Completions {
        #[clap(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Convert a `--max-size` value in MB to bytes, clamping at `u64::MAX`.
pub fn megabytes_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_size_converts_to_bytes() {
        assert_eq!(megabytes_to_bytes(0), 0);
        assert_eq!(megabytes_to_bytes(50), 50 * 1024 * 1024);
    }

    #[test]
    fn huge_max_size_saturates() {
        let cli = Cli::parse_from(["findora", "search", "foo", "--max-size", "18446744073709551615"]);
        let Commands::Search { max_size, .. } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(megabytes_to_bytes(max_size.unwrap()), u64::MAX);
    }
}
