//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::DuplicateSections;

/// Relocate schema nodes into declared sections
#[derive(Parser, Debug)]
#[command(name = "restructure")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Project directory for local config (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restructure a JSON schema and print or write the result
    Apply {
        /// Schema file (stdin when absent or '-')
        #[arg(value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,

        /// Write result to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Pretty-print output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Single-line output
        #[arg(long)]
        compact: bool,

        /// Fail when diagnostics are reported
        #[arg(long)]
        strict: bool,

        /// Destination when a section is declared more than once
        #[arg(long, value_enum)]
        duplicate_sections: Option<DuplicatePolicyArg>,
    },

    /// Report diagnostics without writing output
    Check {
        /// Schema file (stdin when absent or '-')
        #[arg(value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },

    /// Print the schema as a tree
    Tree {
        /// Schema file (stdin when absent or '-')
        #[arg(value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,

        /// Show the tree after restructuring
        #[arg(long)]
        after: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented template config
    Template,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicyArg {
    FirstDeclared,
    Unresolved,
}

impl From<DuplicatePolicyArg> for DuplicateSections {
    fn from(arg: DuplicatePolicyArg) -> Self {
        match arg {
            DuplicatePolicyArg::FirstDeclared => DuplicateSections::FirstDeclared,
            DuplicatePolicyArg::Unresolved => DuplicateSections::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_apply_flags_when_parsing_then_fields_set() {
        let cli = Cli::try_parse_from([
            "restructure",
            "-vv",
            "apply",
            "in.json",
            "-o",
            "out.json",
            "--compact",
            "--duplicate-sections",
            "unresolved",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Apply {
                input,
                output,
                compact,
                duplicate_sections,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("in.json")));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(compact);
                assert_eq!(duplicate_sections, Some(DuplicatePolicyArg::Unresolved));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_pretty_and_compact_when_parsing_then_conflict() {
        let result = Cli::try_parse_from(["restructure", "apply", "--pretty", "--compact"]);
        assert!(result.is_err());
    }
}
