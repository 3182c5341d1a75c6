use clap::{Args, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    format::write_success,
    settings::{list_body, Setting, SettingsUpdate},
    Meilisearch,
};

#[derive(Debug, Default, Args, Serialize)]
pub struct ListIndexes {
    /// Number of indexes to skip
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
    /// Number of indexes to return
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct IndexArg {
    /// The name of the index
    #[clap(value_name = "INDEX")]
    pub index: String,
}

#[derive(Debug, Args)]
pub struct ListSetting {
    /// The name of the index
    #[clap(value_name = "INDEX")]
    pub index: String,
    /// The new values of the setting
    #[clap(required = true, value_name = "VALUES")]
    pub values: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum IndexCommand {
    /// Create an index.
    Create {
        /// The name of the index to create
        index: String,
        /// The primary key of the index
        #[clap(long, aliases = &["primary_key", "primaryKey", "pk"])]
        primary_key: Option<String>,
    },
    /// Delete an index.
    Delete(IndexArg),
    /// Gets a single index.
    Get(IndexArg),
    /// Get all indexes.
    #[clap(aliases = &["list", "all"])]
    GetAll(ListIndexes),
    /// Get the primary key of an index.
    GetPrimaryKey(IndexArg),
    /// Get the stats of an index.
    GetStats(IndexArg),
    /// Get the tasks of an index.
    #[clap(aliases = &["get-all-update-status", "get-tasks"])]
    GetUpdateStatus(IndexArg),
    /// Update the primary key of an index.
    Update {
        /// The name of the index to update
        index: String,
        /// The new primary key of the index
        #[clap(long, aliases = &["primary_key", "primaryKey", "pk"])]
        primary_key: String,
    },
    /// Get the settings of an index.
    GetSettings(IndexArg),
    /// Update the settings of an index.
    UpdateSettings {
        /// The name of the index to update
        index: String,
        #[clap(flatten)]
        settings: SettingsUpdate,
    },
    /// Reset all settings of an index.
    ResetSettings(IndexArg),
    /// Update the displayed attributes of an index.
    UpdateDisplayedAttributes(ListSetting),
    /// Reset displayed attributes of an index.
    ResetDisplayedAttributes(IndexArg),
    /// Update the distinct attribute of an index.
    UpdateDistinctAttribute {
        /// The name of the index to update
        index: String,
        /// The distinct attribute for the index
        distinct_attribute: String,
    },
    /// Reset distinct attribute of an index.
    ResetDistinctAttribute(IndexArg),
    /// Update the filterable attributes of an index.
    UpdateFilterableAttributes(ListSetting),
    /// Reset filterable attributes of an index.
    ResetFilterableAttributes(IndexArg),
    /// Update the ranking rules of an index.
    UpdateRankingRules(ListSetting),
    /// Reset ranking rules of an index.
    ResetRankingRules(IndexArg),
    /// Update the searchable attributes of an index.
    UpdateSearchableAttributes(ListSetting),
    /// Reset searchable attributes of an index.
    ResetSearchableAttributes(IndexArg),
    /// Update the sortable attributes of an index.
    UpdateSortableAttributes(ListSetting),
    /// Reset sortable attributes of an index.
    ResetSortableAttributes(IndexArg),
    /// Update the stop words of an index.
    UpdateStopWords(ListSetting),
    /// Reset stop words of an index.
    ResetStopWords(IndexArg),
    /// Update the synonyms of an index.
    UpdateSynonyms {
        /// The name of the index to update
        index: String,
        /// Synonyms for the index. This should contain JSON passed as a string
        synonyms: String,
    },
    /// Reset synonyms of an index.
    ResetSynonyms(IndexArg),
}

impl IndexCommand {
    pub fn execute(self, meili: Meilisearch) -> Result<()> {
        use IndexCommand::*;

        match self {
            Create { index, primary_key } => meili.create_index(&index, primary_key),
            Delete(IndexArg { index }) => meili.delete_index(&index),
            Get(IndexArg { index }) => meili.get_index(&index),
            GetAll(opt) => meili.get_all_indexes(opt),
            GetPrimaryKey(IndexArg { index }) => meili.get_primary_key(&index),
            GetStats(IndexArg { index }) => meili.get_index_stats(&index),
            GetUpdateStatus(IndexArg { index }) => meili.get_index_tasks(&index),
            Update { index, primary_key } => meili.update_index(&index, primary_key),
            GetSettings(IndexArg { index }) => meili.get_settings(&index),
            UpdateSettings { index, settings } => meili.update_settings(&index, settings),
            ResetSettings(IndexArg { index }) => meili.reset_settings(&index),
            UpdateDistinctAttribute {
                index,
                distinct_attribute,
            } => meili.update_setting(
                &index,
                Setting::DistinctAttribute,
                json!(distinct_attribute),
            ),
            UpdateSynonyms { index, synonyms } => {
                let synonyms = crate::settings::parse_synonyms(&synonyms)?;
                meili.update_setting(&index, Setting::Synonyms, synonyms)
            }
            UpdateDisplayedAttributes(ListSetting { index, values }) => {
                meili.update_setting(&index, Setting::DisplayedAttributes, list_body(values))
            }
            UpdateFilterableAttributes(ListSetting { index, values }) => {
                meili.update_setting(&index, Setting::FilterableAttributes, list_body(values))
            }
            UpdateRankingRules(ListSetting { index, values }) => {
                meili.update_setting(&index, Setting::RankingRules, list_body(values))
            }
            UpdateSearchableAttributes(ListSetting { index, values }) => {
                meili.update_setting(&index, Setting::SearchableAttributes, list_body(values))
            }
            UpdateSortableAttributes(ListSetting { index, values }) => {
                meili.update_setting(&index, Setting::SortableAttributes, list_body(values))
            }
            UpdateStopWords(ListSetting { index, values }) => {
                meili.update_setting(&index, Setting::StopWords, list_body(values))
            }
            ResetDisplayedAttributes(IndexArg { index }) => {
                meili.reset_setting(&index, Setting::DisplayedAttributes)
            }
            ResetDistinctAttribute(IndexArg { index }) => {
                meili.reset_setting(&index, Setting::DistinctAttribute)
            }
            ResetFilterableAttributes(IndexArg { index }) => {
                meili.reset_setting(&index, Setting::FilterableAttributes)
            }
            ResetRankingRules(IndexArg { index }) => {
                meili.reset_setting(&index, Setting::RankingRules)
            }
            ResetSearchableAttributes(IndexArg { index }) => {
                meili.reset_setting(&index, Setting::SearchableAttributes)
            }
            ResetSortableAttributes(IndexArg { index }) => {
                meili.reset_setting(&index, Setting::SortableAttributes)
            }
            ResetStopWords(IndexArg { index }) => meili.reset_setting(&index, Setting::StopWords),
            ResetSynonyms(IndexArg { index }) => meili.reset_setting(&index, Setting::Synonyms),
        }
    }
}

impl Meilisearch {
    fn index_url(&self, index: &str) -> String {
        format!("{}/indexes/{}", self.addr, index)
    }

    fn fetch_index(&self, index: &str) -> Result<Value> {
        self.send(self.get(self.index_url(index)), "Getting index...")
    }

    fn get_index(&self, index: &str) -> Result<()> {
        let value = self.fetch_index(index)?;
        self.display("Index", &value)
    }

    fn get_all_indexes(&self, opt: ListIndexes) -> Result<()> {
        let url = format!(
            "{}/indexes{}",
            self.addr,
            yaup::to_string(&opt).into_diagnostic()?
        );
        let indexes = self.send(self.get(url), "Getting indexes...")?;
        if self.raw {
            return self.display("All Indexes", &indexes);
        }
        // recent servers paginate the indexes in `results`
        match indexes.get("results") {
            Some(results) => self.display("All Indexes", results),
            None => self.display("All Indexes", &indexes),
        }
    }

    fn get_primary_key(&self, index: &str) -> Result<()> {
        let value = self.fetch_index(index)?;
        self.display("Primary Key", &value["primaryKey"])
    }

    fn get_index_stats(&self, index: &str) -> Result<()> {
        let stats = self.send(
            self.get(format!("{}/stats", self.index_url(index))),
            "Getting stats...",
        )?;
        self.display("Stats", &stats)
    }

    fn get_index_tasks(&self, index: &str) -> Result<()> {
        let tasks = self.send(
            self.get(format!("{}/tasks", self.addr))
                .query(&[("indexUids", index)]),
            "Getting update status...",
        )?;
        match tasks.get("results") {
            Some(results) if !self.raw => self.display("Update Status", results),
            _ => self.display("Update Status", &tasks),
        }
    }

    fn create_index(&self, index: &str, primary_key: Option<String>) -> Result<()> {
        let mut body = json!({ "uid": index });
        if let Some(primary_key) = primary_key {
            body["primaryKey"] = json!(primary_key);
        }
        let task = self.send(
            self.post(format!("{}/indexes", self.addr)).json(&body),
            "Creating index...",
        )?;
        self.process_task("Create Index", task, |meili| meili.get_index(index))
    }

    fn update_index(&self, index: &str, primary_key: String) -> Result<()> {
        let body = json!({ "primaryKey": primary_key });
        let task = self.send(
            self.patch(self.index_url(index)).json(&body),
            "Updating index...",
        )?;
        self.process_task("Update Index", task, |meili| meili.get_index(index))
    }

    fn delete_index(&self, index: &str) -> Result<()> {
        let task = self.send(self.delete(self.index_url(index)), "Deleting the index...")?;
        self.process_task("Delete Index", task, |_| {
            write_success(&format!("Index `{index}` successfully deleted"));
            Ok(())
        })
    }
}
