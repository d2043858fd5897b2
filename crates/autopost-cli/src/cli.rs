//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Network Auto-Post - Replay content replication across network sites
#[derive(Parser, Debug)]
#[command(name = "autopost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Replay a save event against a network snapshot
    ///
    /// Loads the network and the policy, saves the given document as the
    /// host would, and prints what replication did.
    ///
    /// Examples:
    ///   autopost replay -n network.json -p policy.toml --site 1 --document 10
    ///   autopost replay -n network.json -p policy.toml -s 1 -d 10 --write
    ///   autopost replay -n network.yaml -p policy.toml -s 1 -d 10 --fields-event
    Replay {
        /// Network snapshot (.json, .yaml)
        #[arg(short, long, env = "AUTOPOST_NETWORK")]
        network: PathBuf,

        /// Policy settings (.toml, .json, .yaml)
        #[arg(short, long, env = "AUTOPOST_POLICY")]
        policy: PathBuf,

        /// Per-type policies that replace the matching entries of --policy
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Site the document was saved on
        #[arg(short, long)]
        site: u64,

        /// Id of the saved document
        #[arg(short, long)]
        document: u64,

        /// Replay the extended-fields save instead of the document save
        #[arg(long)]
        fields_event: bool,

        /// Write the updated network back to the snapshot file
        #[arg(long)]
        write: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the linked copies of a document
    Links {
        /// Network snapshot (.json, .yaml)
        #[arg(short, long, env = "AUTOPOST_NETWORK")]
        network: PathBuf,

        /// Site of the document
        #[arg(short, long)]
        site: u64,

        /// Id of the document
        #[arg(short, long)]
        document: u64,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Load and validate a policy settings file
    CheckPolicy {
        /// Policy settings (.toml, .json, .yaml)
        path: PathBuf,
    },
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
    fn test_parse_replay() {
        let cli = Cli::parse_from([
            "autopost", "replay", "-n", "net.json", "-p", "policy.toml", "-s", "1", "-d", "10",
            "--write",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Replay {
                network: PathBuf::from("net.json"),
                policy: PathBuf::from("policy.toml"),
                overrides: None,
                site: 1,
                document: 10,
                fields_event: false,
                write: true,
                json: false,
            })
        );
    }

    #[test]
    fn test_parse_check_policy() {
        let cli = Cli::parse_from(["autopost", "-v", "check-policy", "policy.toml"]);
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Some(Commands::CheckPolicy {
                path: PathBuf::from("policy.toml")
            })
        );
    }

    #[test]
    fn test_site_must_be_numeric() {
        let result = Cli::try_parse_from([
            "autopost", "links", "-n", "net.json", "-s", "en", "-d", "10",
        ]);
        assert!(result.is_err());
    }
}
