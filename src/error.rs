use std::{fmt, path::PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Missing {missing}")]
    #[diagnostic(
        code(meilisearch_cli::credentials),
        help("Pass them on the command line or export them in your environment.")
    )]
    MissingCredentials { missing: Missing },

    #[error("{message}{}", code_suffix(.code))]
    #[diagnostic(code(meilisearch_cli::api))]
    Api {
        code: Option<String>,
        message: String,
        #[help]
        link: Option<String>,
    },

    #[error("Task {uid} {status}: {message}")]
    #[diagnostic(code(meilisearch_cli::task))]
    TaskFailed {
        uid: u64,
        status: String,
        message: String,
        #[help]
        link: Option<String>,
    },

    #[error("Unable to parse `{input}` as JSON")]
    #[diagnostic(code(meilisearch_cli::json))]
    Json {
        input: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unable to parse `{input}` as JSON: expected {expected}")]
    #[diagnostic(code(meilisearch_cli::json))]
    UnexpectedJson {
        input: String,
        expected: &'static str,
    },

    #[error("File `{}` does not exist", .0.display())]
    #[diagnostic(code(meilisearch_cli::file))]
    FileNotFound(PathBuf),

    #[error("File type `{extension}` is not accepted")]
    #[diagnostic(
        code(meilisearch_cli::file),
        help("Accepted file types are .json, .csv, and .ndjson")
    )]
    UnsupportedFileType { extension: String },

    #[error("The batch size must be at least 1")]
    #[diagnostic(code(meilisearch_cli::batch))]
    InvalidBatchSize,

    #[error("No setting to update")]
    #[diagnostic(
        code(meilisearch_cli::settings),
        help("Give at least one of the setting flags, see `index update-settings --help`.")
    )]
    EmptySettings,

    #[error("Unable to build the documentation tree: no link was found")]
    #[diagnostic(code(meilisearch_cli::docs))]
    EmptyDocumentation,

    #[error("Invalid header `{header}`")]
    #[diagnostic(
        code(meilisearch_cli::header),
        help("Headers are written `name: value`, eg. `x-meilisearch-client: turbo-doggo/42.9000`")
    )]
    InvalidHeader { header: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Url,
    MasterKey,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Url => write!(f, "url (`--url` or `MEILI_HTTP_ADDR`)"),
            Credential::MasterKey => {
                write!(f, "master key (`--master-key` or `MEILI_MASTER_KEY`)")
            }
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Missing(pub Vec<Credential>);

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, credential) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{credential}")?;
        }
        Ok(())
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(" ({code})"))
        .unwrap_or_default()
}

/// Error payload returned by MeiliSearch on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ResponseError {
    pub message: String,
    pub code: Option<String>,
    pub link: Option<String>,
}

impl CliError {
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ResponseError>(body) {
            Ok(error) => CliError::Api {
                code: error.code,
                message: error.message,
                link: error.link,
            },
            Err(_) => CliError::Api {
                code: None,
                message: if body.trim().is_empty() {
                    format!("The server answered with status {status}")
                } else {
                    format!("The server answered with status {status}: {}", body.trim())
                },
                link: None,
            },
        }
    }
}
