use std::{
    fs::File,
    path::{Path, PathBuf},
};

use clap::{Args, Subcommand};
use log::{debug, warn};
use miette::{IntoDiagnostic, Result};
use reqwest::{blocking::RequestBuilder, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::{error::CliError, meilisearch::task_uid, Meilisearch};

pub type DocId = String;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// Add documents to an index.
    #[clap(aliases = &["a"])]
    Add(Documents),
    /// Add documents to an index from a file.
    AddFromFile(DocumentsFile),
    /// Add documents to an index in batches.
    AddInBatches(DocumentsBatches),
    /// Update documents in an index.
    #[clap(aliases = &["u"])]
    Update(Documents),
    /// Update documents in an index from a file.
    UpdateFromFile(DocumentsFile),
    /// Update documents in an index in batches.
    UpdateInBatches(DocumentsBatches),
    /// Delete a document from an index.
    #[clap(aliases = &["d"])]
    Delete {
        /// The name of the index from which to delete the document
        index: String,
        /// The ID of the document to delete
        document_id: DocId,
    },
    /// Delete multiple documents from an index.
    DeleteMultiple {
        /// The name of the index from which to delete the documents
        index: String,
        /// The IDs of the documents to delete
        #[clap(required = true)]
        document_ids: Vec<DocId>,
    },
    /// Delete all documents from an index.
    DeleteAll {
        /// The name of the index from which to delete the documents
        index: String,
    },
    /// Get a document from an index.
    #[clap(aliases = &["g"])]
    Get {
        /// The name of the index from which to retrieve the document
        index: String,
        /// The ID of the document to retrieve
        document_id: DocId,
        /// Comma separated list of the attributes to return
        #[clap(long, aliases = &["field"])]
        fields: Option<String>,
    },
    /// Get all documents from an index.
    GetAll {
        /// The name of the index from which to retrieve the documents
        index: String,
        #[clap(flatten)]
        params: GetDocumentsParameters,
    },
}

#[derive(Debug, Args)]
pub struct Documents {
    /// The name of the index
    index: String,
    /// A JSON string of documents
    documents: String,
    /// The primary key for the documents. Will be ignored if a primary key is already set
    #[clap(long, aliases = &["primary_key", "primaryKey", "pk"])]
    primary_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct DocumentsFile {
    /// The name of the index
    index: String,
    /// The path to the file containing the documents. Accepted file types are .json, .csv, and .ndjson
    file_path: PathBuf,
    /// The primary key for the documents. Will be ignored if a primary key is already set
    #[clap(long, aliases = &["primary_key", "primaryKey", "pk"])]
    primary_key: Option<String>,
    /// Configure the character separating CSV fields. Must be a string containing one ASCII character.
    #[clap(long)]
    csv_delimiter: Option<String>,
}

#[derive(Debug, Args)]
pub struct DocumentsBatches {
    /// The name of the index
    index: String,
    /// A JSON string of documents
    documents: String,
    /// The primary key for the documents. Will be ignored if a primary key is already set
    #[clap(long, aliases = &["primary_key", "primaryKey", "pk"])]
    primary_key: Option<String>,
    /// The number of documents that should be included in each batch
    #[clap(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

#[derive(Debug, Default, PartialEq, Eq, Args, Serialize)]
pub struct GetDocumentsParameters {
    /// Number of documents to skip
    #[clap(long, aliases = &["from"])]
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    /// Number of documents to return
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    /// Comma separated list of the attributes to return
    #[clap(long, aliases = &["field"])]
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<String>,
}

/// `post` adds or replaces whole documents, `put` adds or updates their fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Add,
    Update,
}

impl Method {
    fn title(&self) -> &'static str {
        match self {
            Method::Add => "Add Documents Result",
            Method::Update => "Update Documents Result",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Method::Add => "Adding documents...",
            Method::Update => "Updating documents...",
        }
    }
}

impl DocumentsCommand {
    pub fn execute(self, meili: Meilisearch) -> Result<()> {
        match self {
            DocumentsCommand::Add(params) => meili.index_documents(params, Method::Add),
            DocumentsCommand::Update(params) => meili.index_documents(params, Method::Update),
            DocumentsCommand::AddFromFile(params) => meili.index_file(params, Method::Add),
            DocumentsCommand::UpdateFromFile(params) => meili.index_file(params, Method::Update),
            DocumentsCommand::AddInBatches(params) => meili.index_batches(params, Method::Add),
            DocumentsCommand::UpdateInBatches(params) => {
                meili.index_batches(params, Method::Update)
            }
            DocumentsCommand::Delete { index, document_id } => {
                meili.delete_one(&index, &document_id)
            }
            DocumentsCommand::DeleteMultiple {
                index,
                document_ids,
            } => meili.delete_batch(&index, &document_ids),
            DocumentsCommand::DeleteAll { index } => meili.delete_all(&index),
            DocumentsCommand::Get {
                index,
                document_id,
                fields,
            } => meili.get_one_document(&index, &document_id, fields),
            DocumentsCommand::GetAll { index, params } => meili.get_all_documents(&index, params),
        }
    }
}

/// Parses the documents given on the command line. A single object is
/// accepted and sent as an array of one document.
pub fn parse_documents(input: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(input).map_err(|source| CliError::Json {
        input: input.to_string(),
        source,
    })?;
    match value {
        Value::Array(documents) if documents.iter().all(Value::is_object) => Ok(documents),
        Value::Object(document) => Ok(vec![Value::Object(document)]),
        _ => Err(CliError::UnexpectedJson {
            input: input.to_string(),
            expected: "an object or an array of objects",
        }
        .into()),
    }
}

/// Returns the content-type matching the extension of the file.
pub fn content_type(path: &Path) -> Result<&'static str> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()).into());
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "json" => Ok("application/json"),
        "csv" => Ok("text/csv"),
        "ndjson" | "jsonl" | "jsonlines" => Ok("application/x-ndjson"),
        _ => Err(CliError::UnsupportedFileType {
            extension: extension.to_string(),
        }
        .into()),
    }
}

pub fn batches(documents: &[Value], batch_size: usize) -> Result<std::slice::Chunks<'_, Value>> {
    if batch_size == 0 {
        return Err(CliError::InvalidBatchSize.into());
    }
    Ok(documents.chunks(batch_size))
}

impl Meilisearch {
    fn documents_url(&self, index: &str) -> String {
        format!("{}/indexes/{}/documents", self.addr, index)
    }

    fn documents_request(
        &self,
        index: &str,
        method: Method,
        primary_key: Option<&str>,
    ) -> RequestBuilder {
        let url = self.documents_url(index);
        let client = match method {
            Method::Add => self.post(url),
            Method::Update => self.put(url),
        };
        if let Some(primary_key) = primary_key {
            client.query(&[("primaryKey", primary_key)])
        } else {
            client
        }
    }

    fn index_documents(&self, params: Documents, method: Method) -> Result<()> {
        let documents = parse_documents(&params.documents)?;
        let task = self.send(
            self.documents_request(&params.index, method, params.primary_key.as_deref())
                .json(&documents),
            method.message(),
        )?;
        self.process_task(method.title(), task, |meili| {
            meili.get_all_documents(&params.index, GetDocumentsParameters::default())
        })
    }

    fn index_file(&self, params: DocumentsFile, method: Method) -> Result<()> {
        let content_type = content_type(&params.file_path)?;
        let client = self
            .documents_request(&params.index, method, params.primary_key.as_deref())
            .header(CONTENT_TYPE, content_type);
        let client = match params.csv_delimiter {
            Some(delimiter) if content_type == "text/csv" => {
                client.query(&[("csvDelimiter", delimiter)])
            }
            Some(_) => {
                warn!("--csv-delimiter is only used with csv files and will be ignored");
                client
            }
            None => client,
        };
        let file = File::open(&params.file_path).into_diagnostic()?;
        let task = self.send(client.body(file), method.message())?;
        self.process_task(method.title(), task, |meili| {
            meili.get_all_documents(&params.index, GetDocumentsParameters::default())
        })
    }

    fn index_batches(&self, params: DocumentsBatches, method: Method) -> Result<()> {
        let documents = parse_documents(&params.documents)?;
        let mut tasks = Vec::new();
        for (i, batch) in batches(&documents, params.batch_size)?.enumerate() {
            debug!("sending batch {} of {} documents", i, batch.len());
            let task = self.send(
                self.documents_request(&params.index, method, params.primary_key.as_deref())
                    .json(batch),
                method.message(),
            )?;
            tasks.push(task);
        }

        if !self.wait {
            return self.display(method.title(), &Value::Array(tasks));
        }
        for uid in tasks.iter().filter_map(task_uid) {
            self.wait_for_task(uid)?;
        }
        self.get_all_documents(&params.index, GetDocumentsParameters::default())
    }

    fn get_one_document(&self, index: &str, docid: &str, fields: Option<String>) -> Result<()> {
        let mut request = self.get(format!("{}/{}", self.documents_url(index), docid));
        if let Some(fields) = fields {
            request = request.query(&[("fields", fields)]);
        }
        let document = self.send(request, "Getting document...")?;
        self.display("Document", &document)
    }

    fn get_all_documents(&self, index: &str, params: GetDocumentsParameters) -> Result<()> {
        let url = format!(
            "{}{}",
            self.documents_url(index),
            yaup::to_string(&params).into_diagnostic()?
        );
        let documents = self.send(self.get(url), "Getting documents...")?;
        match documents.get("results") {
            Some(results) if !self.raw => self.display("Documents", results),
            _ => self.display("Documents", &documents),
        }
    }

    fn delete_all(&self, index: &str) -> Result<()> {
        let task = self.send(
            self.delete(self.documents_url(index)),
            "Deleting all documents...",
        )?;
        self.process_task("Delete Documents Result", task, |meili| {
            meili.get_all_documents(index, GetDocumentsParameters::default())
        })
    }

    fn delete_one(&self, index: &str, docid: &str) -> Result<()> {
        let task = self.send(
            self.delete(format!("{}/{}", self.documents_url(index), docid)),
            "Deleting document...",
        )?;
        self.process_task("Delete Document Result", task, |meili| {
            meili.get_all_documents(index, GetDocumentsParameters::default())
        })
    }

    fn delete_batch(&self, index: &str, docids: &[DocId]) -> Result<()> {
        let task = self.send(
            self.post(format!("{}/delete-batch", self.documents_url(index)))
                .json(docids),
            "Deleting documents...",
        )?;
        self.process_task("Delete Documents Result", task, |meili| {
            meili.get_all_documents(index, GetDocumentsParameters::default())
        })
    }
}
