use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CliOverrides;

#[derive(Parser)]
#[command(
    name = "odiff-rs",
    version,
    about = "Compare images with odiff and visualize the differences"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .odiff/config.toml with commented-out defaults
    Init {
        /// Overwrite an existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare two images and report the result (exit 0 = match, 1 = different, 2 = error)
    Compare {
        /// Base image
        base: PathBuf,
        /// Image to compare against the base
        compare: PathBuf,
        /// Where odiff writes the diff image (default: discarded)
        diff: Option<PathBuf>,
        /// Write an animated PNG cycling base, compare and diff
        #[arg(long, value_name = "PATH")]
        apng: Option<PathBuf>,
        /// Write a markdown summary with the embedded animation
        #[arg(long, value_name = "PATH")]
        markdown: Option<PathBuf>,
        #[command(flatten)]
        overrides: CliOverrides,
    },

    /// Run the odiff executable directly, passing all arguments through
    Run {
        /// Path to the odiff executable (overrides config and env)
        #[arg(long)]
        binary: Option<PathBuf>,
        /// Arguments for odiff, after `--`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn compare_with_overrides() {
        let cli = Cli::try_parse_from([
            "odiff-rs",
            "compare",
            "a.png",
            "b.png",
            "--ignore",
            "0:0-10:10",
            "--ignore",
            "5:5-6:6",
            "--threshold",
            "0.2",
            "--fail-on-layout",
            "--apng",
            "out.apng",
        ])
        .unwrap();
        let Command::Compare {
            base,
            diff,
            apng,
            overrides,
            ..
        } = cli.command
        else {
            panic!("expected compare");
        };
        assert_eq!(base, PathBuf::from("a.png"));
        assert!(diff.is_none());
        assert_eq!(apng, Some(PathBuf::from("out.apng")));
        assert_eq!(overrides.ignore.len(), 2);
        assert_eq!(overrides.threshold, Some(0.2));
        assert!(overrides.fail_on_layout);
    }

    #[test]
    fn compare_rejects_bad_threshold() {
        let parsed =
            Cli::try_parse_from(["odiff-rs", "compare", "a.png", "b.png", "--threshold", "3"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn run_passes_hyphenated_args_through() {
        let cli = Cli::try_parse_from(["odiff-rs", "run", "--", "--version", "-x"]).unwrap();
        let Command::Run { binary, args } = cli.command else {
            panic!("expected run");
        };
        assert!(binary.is_none());
        assert_eq!(args, vec![OsString::from("--version"), OsString::from("-x")]);
    }
}
