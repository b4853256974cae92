use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "jrc")]
#[command(about = "Query the configuration service and scholarly APIs")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Debug logging")]
    pub debug: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_log: bool,

    #[arg(long, global = true, env = "JRC_SETTINGS", help = "TOML client settings")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DoiSource {
    Biorxiv,
    Crossref,
    Datacite,
    Figshare,
    Oa,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a configuration document from the configuration service
    Config {
        name: String,
        /// Dotted path inside the document, e.g. mail.address
        #[arg(long)]
        path: Option<String>,
    },
    /// Look up a DOI at one of the metadata sources
    Doi {
        #[arg(value_enum)]
        source: DoiSource,
        doi: String,
    },
    /// Search arXiv
    Arxiv { query: String },
    /// Fetch an ORCID record
    Orcid { orcid: String },
    /// Query the People system
    People {
        #[arg(long, conflicts_with_all = ["name", "suporg"])]
        id: Option<String>,
        #[arg(long, conflicts_with = "suporg")]
        name: Option<String>,
        #[arg(long)]
        suporg: Option<String>,
        #[arg(long, default_value = "0")]
        page: u32,
    },
    /// Find the PMID for a DOI
    Pmid { doi: String },
    /// Convert a PMID to a PMCID or DOI
    ConvertPmid {
        pmid: String,
        #[arg(long, default_value = "pmcid")]
        to: String,
    },
    /// Check the JSON Web Token held in an environment variable
    Token {
        #[arg(long, default_value = crate::core::token::DEFAULT_TOKEN_ENV)]
        env: String,
    },
    /// Print the run banner for a program
    RunData { program: String, version: String },
    /// Fold diacritics to ASCII
    Diacritics { text: String },
}
