mod docs;
mod documents;
mod dump;
mod error;
mod format;
mod indexes;
mod inner;
mod instance;
mod meilisearch;
mod options;
mod search;
mod settings;

use clap::Parser;
use log::LevelFilter;
use miette::Result;
use options::{Command, Options};

use crate::meilisearch::{Auth, Meilisearch};

fn main() -> Result<()> {
    let opt = Options::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(opt.global.verbose).to_string()),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let connect = |auth| Meilisearch::connect(&opt.global, auth);

    match opt.command {
        Command::Index(command) => command.execute(connect(Auth::MasterKey)?),
        Command::Documents(command) => command.execute(connect(Auth::MasterKey)?),
        Command::Dump(command) => command.execute(connect(Auth::MasterKey)?),
        Command::Search(search) => search.execute(connect(Auth::MasterKey)?),
        Command::Health => connect(Auth::UrlOnly)?.healthcheck(),
        Command::GetVersion => connect(Auth::MasterKey)?.version(),
        Command::GetKeys => connect(Auth::MasterKey)?.get_keys(),
        Command::GetAllStats => connect(Auth::MasterKey)?.stats(),
        Command::DocsLink(docs) => docs.execute(&opt.global),
        Command::ApiDocsLink => docs::api_docs_link(),
        Command::Inner(command) => command.execute(),
    }
}

/// `RUST_LOG` wins over the verbosity flag.
fn log_level(verbose: usize) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
