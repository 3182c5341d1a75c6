use clap::Args;
use miette::{IntoDiagnostic, Result};
use serde_json::{json, Map, Value};

use crate::{error::CliError, Meilisearch};

/// A single setting of an index, reachable under `/indexes/{uid}/settings/{route}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    DisplayedAttributes,
    DistinctAttribute,
    FilterableAttributes,
    RankingRules,
    SearchableAttributes,
    SortableAttributes,
    StopWords,
    Synonyms,
}

impl Setting {
    pub fn route(&self) -> &'static str {
        match self {
            Setting::DisplayedAttributes => "displayed-attributes",
            Setting::DistinctAttribute => "distinct-attribute",
            Setting::FilterableAttributes => "filterable-attributes",
            Setting::RankingRules => "ranking-rules",
            Setting::SearchableAttributes => "searchable-attributes",
            Setting::SortableAttributes => "sortable-attributes",
            Setting::StopWords => "stop-words",
            Setting::Synonyms => "synonyms",
        }
    }

    /// Key of the setting in the settings object.
    pub fn key(&self) -> &'static str {
        match self {
            Setting::DisplayedAttributes => "displayedAttributes",
            Setting::DistinctAttribute => "distinctAttribute",
            Setting::FilterableAttributes => "filterableAttributes",
            Setting::RankingRules => "rankingRules",
            Setting::SearchableAttributes => "searchableAttributes",
            Setting::SortableAttributes => "sortableAttributes",
            Setting::StopWords => "stopWords",
            Setting::Synonyms => "synonyms",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Setting::DisplayedAttributes => "Displayed Attributes",
            Setting::DistinctAttribute => "Distinct Attribute",
            Setting::FilterableAttributes => "Filterable Attributes",
            Setting::RankingRules => "Ranking Rules",
            Setting::SearchableAttributes => "Searchable Attributes",
            Setting::SortableAttributes => "Sortable Attributes",
            Setting::StopWords => "Stop Words",
            Setting::Synonyms => "Synonyms",
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct SettingsUpdate {
    /// Fields displayed in the returned documents
    #[clap(long, multiple_occurrences = true)]
    displayed_attributes: Vec<String>,
    /// The distinct attribute for the index
    #[clap(long)]
    distinct_attribute: Option<String>,
    /// Filterable attributes for the index
    #[clap(long, multiple_occurrences = true)]
    filterable_attributes: Vec<String>,
    /// The ranking rules for the index
    #[clap(long, multiple_occurrences = true)]
    ranking_rules: Vec<String>,
    /// Fields in which to search for matching query words sorted by order of importance
    #[clap(long, multiple_occurrences = true)]
    searchable_attributes: Vec<String>,
    /// The sortable attributes for the index
    #[clap(long, multiple_occurrences = true)]
    sortable_attributes: Vec<String>,
    /// The stop words for the index
    #[clap(long, multiple_occurrences = true)]
    stop_words: Vec<String>,
    /// Synonyms for the index. This should contain JSON passed as a string
    #[clap(long)]
    synonyms: Option<String>,
}

impl SettingsUpdate {
    /// Builds the body of the settings update with only the given settings.
    pub fn to_body(&self) -> Result<Map<String, Value>> {
        let mut settings = Map::new();
        let lists = [
            (Setting::DisplayedAttributes, &self.displayed_attributes),
            (Setting::FilterableAttributes, &self.filterable_attributes),
            (Setting::RankingRules, &self.ranking_rules),
            (Setting::SearchableAttributes, &self.searchable_attributes),
            (Setting::SortableAttributes, &self.sortable_attributes),
            (Setting::StopWords, &self.stop_words),
        ];
        for (setting, values) in lists {
            if !values.is_empty() {
                settings.insert(setting.key().to_string(), json!(values));
            }
        }
        if let Some(ref distinct) = self.distinct_attribute {
            settings.insert(Setting::DistinctAttribute.key().to_string(), json!(distinct));
        }
        if let Some(ref synonyms) = self.synonyms {
            settings.insert(Setting::Synonyms.key().to_string(), parse_synonyms(synonyms)?);
        }
        if settings.is_empty() {
            return Err(CliError::EmptySettings.into());
        }
        Ok(settings)
    }
}

/// Synonyms are given as a JSON object mapping a word to its synonyms.
pub fn parse_synonyms(input: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(input).map_err(|source| CliError::Json {
        input: input.to_string(),
        source,
    })?;
    if !value.is_object() {
        return Err(CliError::UnexpectedJson {
            input: input.to_string(),
            expected: "an object",
        }
        .into());
    }
    Ok(value)
}

impl Meilisearch {
    fn settings_url(&self, index: &str) -> String {
        format!("{}/indexes/{}/settings", self.addr, index)
    }

    fn setting_url(&self, index: &str, setting: Setting) -> String {
        format!("{}/{}", self.settings_url(index), setting.route())
    }

    pub fn get_settings(&self, index: &str) -> Result<()> {
        let settings = self.send(self.get(self.settings_url(index)), "Getting settings...")?;
        self.display("Settings", &settings)
    }

    pub fn update_settings(&self, index: &str, update: SettingsUpdate) -> Result<()> {
        let body = update.to_body()?;
        let task = self.send(
            self.patch(self.settings_url(index)).json(&body),
            "Updating settings...",
        )?;
        self.process_task("Update Settings", task, |meili| meili.get_settings(index))
    }

    pub fn reset_settings(&self, index: &str) -> Result<()> {
        let task = self.send(
            self.delete(self.settings_url(index)),
            "Resetting settings...",
        )?;
        self.process_task("Reset Settings", task, |meili| meili.get_settings(index))
    }

    pub fn get_setting(&self, index: &str, setting: Setting) -> Result<()> {
        let value = self.send(
            self.get(self.setting_url(index, setting)),
            &format!("Getting {}...", setting.title().to_lowercase()),
        )?;
        self.display(setting.title(), &value)
    }

    pub fn update_setting(&self, index: &str, setting: Setting, value: Value) -> Result<()> {
        let task = self.send(
            self.put(self.setting_url(index, setting)).json(&value),
            &format!("Updating {}...", setting.title().to_lowercase()),
        )?;
        self.process_task(&format!("Update {}", setting.title()), task, |meili| {
            meili.get_setting(index, setting)
        })
    }

    pub fn reset_setting(&self, index: &str, setting: Setting) -> Result<()> {
        let task = self.send(
            self.delete(self.setting_url(index, setting)),
            &format!("Resetting {}...", setting.title().to_lowercase()),
        )?;
        self.process_task(&format!("Reset {}", setting.title()), task, |meili| {
            meili.get_setting(index, setting)
        })
    }
}

/// Json body of a single setting update made of a list of strings.
pub fn list_body(values: Vec<String>) -> Value {
    Value::Array(values.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_given_settings_are_sent() {
        let update = SettingsUpdate {
            displayed_attributes: vec!["title".into(), "genre".into()],
            distinct_attribute: Some("id".into()),
            stop_words: vec!["the".into()],
            ..SettingsUpdate::default()
        };
        let body = update.to_body().unwrap();
        assert_eq!(
            Value::Object(body),
            json!({
                "displayedAttributes": ["title", "genre"],
                "stopWords": ["the"],
                "distinctAttribute": "id",
            })
        );
    }

    #[test]
    fn empty_update_is_refused() {
        let error = SettingsUpdate::default().to_body().unwrap_err();
        assert_eq!(error.to_string(), "No setting to update");
    }

    #[test]
    fn synonyms_must_be_a_json_object() {
        let synonyms = parse_synonyms(r#"{"wolverine": ["logan", "xmen"]}"#).unwrap();
        assert_eq!(synonyms["wolverine"], json!(["logan", "xmen"]));

        let error = parse_synonyms("test").unwrap_err();
        assert!(error.to_string().starts_with("Unable to parse `test`"));

        let error = parse_synonyms(r#"["logan"]"#).unwrap_err();
        assert!(error.to_string().contains("expected an object"));
    }

    #[test]
    fn settings_update_with_bad_synonyms() {
        let update = SettingsUpdate {
            synonyms: Some("test".into()),
            ..SettingsUpdate::default()
        };
        assert!(update.to_body().is_err());
    }

    #[test]
    fn routes_and_keys() {
        assert_eq!(Setting::StopWords.route(), "stop-words");
        assert_eq!(Setting::StopWords.key(), "stopWords");
        assert_eq!(Setting::DistinctAttribute.title(), "Distinct Attribute");
    }

    #[test]
    fn list_of_values() {
        assert_eq!(
            list_body(vec!["typo".into(), "words".into()]),
            json!(["typo", "words"])
        );
    }
}
