use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use memento_crypto::HashAlgorithm;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(
    name = "memento",
    about = "Memento — timestamped proof of creation",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file; defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the content hash of a file
    Hash(HashArgs),
    /// Generate the local wallet key
    Keygen(KeygenArgs),
    /// Register a proof of creation for a file
    Create(CreateArgs),
    /// Check whether a proof exists for a file hash
    Exists(LookupArgs),
    /// Show the certificate for a file hash
    Show(LookupArgs),
    /// Count the proofs registered by an address
    Count(CountArgs),
    /// Mine pending registry transactions
    Mine(MineArgs),
    /// Show the status of a registry transaction
    Status(StatusArgs),
    /// Show the local wallet address
    Address(AddressArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct HashArgs {
    pub path: PathBuf,
    /// Override the configured algorithm (sha256 or blake3)
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Replace an existing key
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    pub path: PathBuf,
    #[arg(short, long)]
    pub title: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    /// Creation date, YYYY-MM-DD; defaults to today
    #[arg(long)]
    pub date: Option<String>,
    /// document, code, design, music, video, or other
    #[arg(long = "type", default_value = "document")]
    pub content_type: String,
}

#[derive(Args)]
pub struct LookupArgs {
    /// File hash, 64 hex characters with or without 0x
    pub hash: String,
}

#[derive(Args)]
pub struct CountArgs {
    /// Creator address; defaults to the local wallet
    pub address: Option<String>,
}

#[derive(Args)]
pub struct MineArgs {}

#[derive(Args)]
pub struct StatusArgs {
    pub tx: String,
}

#[derive(Args)]
pub struct AddressArgs {}

#[derive(Args)]
pub struct ConfigArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hash() {
        let cli = Cli::try_parse_from(["memento", "hash", "song.wav"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("song.wav"));
            assert!(args.algorithm.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_hash_algorithm() {
        let cli = Cli::try_parse_from(["memento", "hash", "a.bin", "--algorithm", "blake3"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.algorithm, Some(HashAlgorithm::Blake3));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(Cli::try_parse_from(["memento", "hash", "a.bin", "--algorithm", "md5"]).is_err());
    }

    #[test]
    fn parse_create() {
        let cli = Cli::try_parse_from([
            "memento", "create", "thesis.pdf", "-t", "Thesis", "--tags", "ml,nlp", "--type", "code",
        ])
        .unwrap();
        if let Command::Create(args) = cli.command {
            assert_eq!(args.title, "Thesis");
            assert_eq!(args.tags, Some("ml,nlp".into()));
            assert_eq!(args.content_type, "code");
            assert!(args.date.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn create_requires_title() {
        assert!(Cli::try_parse_from(["memento", "create", "thesis.pdf"]).is_err());
    }

    #[test]
    fn parse_count_default_address() {
        let cli = Cli::try_parse_from(["memento", "count"]).unwrap();
        if let Command::Count(args) = cli.command {
            assert!(args.address.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "memento", "mine", "--verbose", "--config", "alt.toml", "--format", "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::try_parse_from(["memento", "config"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("memento.toml"));
        assert_eq!(cli.format, OutputFormat::Text);
    }
}
