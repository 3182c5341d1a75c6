use clap::{Args, Parser, Subcommand};
use miette::Result;

use crate::{
    docs::DocsLink, documents::DocumentsCommand, dump::DumpCommand, indexes::IndexCommand,
    inner::Inner, meilisearch::parse_header, search::Search,
};

pub const DEFAULT_USER_AGENT: &str = concat!("meilisearch-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[clap(name = "meilisearch-cli", version, about = "A command line client for MeiliSearch")]
pub struct Options {
    #[clap(flatten)]
    pub global: GlobalOptions,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// The url to the MeiliSearch instance (ex: http://localhost:7700)
    #[clap(global = true, long, env = "MEILI_HTTP_ADDR")]
    pub url: Option<String>,

    /// The master key for the MeiliSearch instance
    #[clap(global = true, long, env = "MEILI_MASTER_KEY", hide_env_values = true)]
    pub master_key: Option<String>,

    /// Wait for MeiliSearch to finish processing the data and display the result.
    /// Otherwise the enqueued task is displayed immediately.
    #[clap(global = true, short, long)]
    pub wait: bool,

    /// Display the raw JSON instead of the formatted output
    #[clap(global = true, long)]
    pub raw: bool,

    /// Verbose mode (-v, -vv, etc)
    #[clap(global = true, short, parse(from_occurrences))]
    pub verbose: usize,

    /// Interval between each task status check (in milliseconds)
    #[clap(global = true, long, default_value = "50")]
    pub interval: u64,

    /// Use a specific http User-Agent for your request
    #[clap(global = true, long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Use a specific http header for your request.
    /// Eg. `meilisearch-cli health --custom-header "x-meilisearch-client: turbo-doggo/42.9000"`
    #[clap(global = true, long)]
    pub custom_header: Option<String>,
}

impl GlobalOptions {
    /// The `--custom-header` split into its name and value.
    pub fn header(&self) -> Result<Option<(String, String)>> {
        self.custom_header.as_deref().map(parse_header).transpose()
    }
}

impl Default for GlobalOptions {
    fn default() -> Self {
        GlobalOptions {
            url: None,
            master_key: None,
            wait: false,
            raw: false,
            verbose: 0,
            interval: 50,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            custom_header: None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the indexes and their settings.
    #[clap(subcommand)]
    Index(IndexCommand),
    /// Manage the documents of an index.
    #[clap(subcommand, aliases = &["docs", "document"])]
    Documents(DocumentsCommand),
    /// Create a dump or get the status of a dump creation.
    #[clap(subcommand)]
    Dump(DumpCommand),
    /// Search in an index.
    #[clap(aliases = &["s"])]
    Search(Search),
    /// Checks the status of the server.
    Health,
    /// Gets the MeiliSearch version information.
    #[clap(aliases = &["version"])]
    GetVersion,
    /// Gets the API keys.
    #[clap(aliases = &["keys"])]
    GetKeys,
    /// Gets the stats of all the indexes.
    #[clap(aliases = &["stats"])]
    GetAllStats,
    /// Display a clickable tree of the MeiliSearch documentation.
    DocsLink(DocsLink),
    /// Display a clickable link to the MeiliSearch API reference.
    ApiDocsLink,
    /// Commands related to the cli itself.
    #[clap(name = "self", subcommand)]
    Inner(Inner),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Options::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let opt = Options::try_parse_from([
            "meilisearch-cli",
            "index",
            "get",
            "movies",
            "--url",
            "http://localhost:7700",
            "--master-key",
            "masterKey",
            "-w",
            "--raw",
            "-vv",
        ])
        .unwrap();
        assert_eq!(opt.global.url.as_deref(), Some("http://localhost:7700"));
        assert_eq!(opt.global.master_key.as_deref(), Some("masterKey"));
        assert!(opt.global.wait);
        assert!(opt.global.raw);
        assert_eq!(opt.global.verbose, 2);
        assert_eq!(opt.global.user_agent, DEFAULT_USER_AGENT);
    }
}
