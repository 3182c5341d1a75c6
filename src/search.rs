use clap::Args;
use miette::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};

use crate::{
    format::{columns, render_cell},
    Meilisearch,
};

#[derive(Debug, Args)]
pub struct Search {
    /// The name of the index in which to search
    index: String,
    /// The query
    query: Option<String>,
    #[clap(flatten)]
    params: SearchParameters,
}

#[derive(Debug, Default, PartialEq, Eq, Args, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    /// Number of documents to skip
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    /// Maximum number of documents returned
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    /// Filter queries by an attribute's value
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    /// Display the count of matches per facet
    #[clap(long, multiple_occurrences = true)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<String>,
    /// Attributes to display in the returned documents
    #[clap(long, multiple_occurrences = true)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes_to_retrieve: Vec<String>,
    /// Attributes whose values have to be cropped
    #[clap(long, multiple_occurrences = true)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes_to_crop: Vec<String>,
    /// Maximum length of cropped value in words
    #[clap(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    crop_length: Option<usize>,
    /// Highlight matching terms contained in an attribute
    #[clap(long, multiple_occurrences = true)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes_to_highlight: Vec<String>,
    /// Return matching terms location
    #[clap(long, aliases = &["matches"])]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    show_matches_position: bool,
    /// Sort search results by an attribute's value, eg. `release_date:desc`
    #[clap(long, multiple_occurrences = true)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort: Vec<String>,
}

impl Search {
    pub fn execute(self, meili: Meilisearch) -> Result<()> {
        meili.search(
            &self.index,
            self.query.as_deref().unwrap_or_default(),
            &self.params,
        )
    }
}

/// Body of the search request. The query is only sent when not empty.
pub fn search_body(query: &str, params: &SearchParameters) -> Map<String, Value> {
    let mut body = match serde_json::to_value(params) {
        Ok(Value::Object(body)) => body,
        _ => Map::new(),
    };
    if !query.is_empty() {
        body.insert("q".to_string(), Value::String(query.to_string()));
    }
    body
}

/// Renders the hits as a table, one column per attribute, followed by a
/// summary of the search.
pub fn render_hits(response: &Value) -> String {
    let hits: Vec<&Map<String, Value>> = response["hits"]
        .as_array()
        .map(|hits| hits.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default();
    let total = response["estimatedTotalHits"]
        .as_u64()
        .or_else(|| response["totalHits"].as_u64())
        .or_else(|| response["nbHits"].as_u64())
        .unwrap_or(hits.len() as u64);
    let time = response["processingTimeMs"].as_u64().unwrap_or_default();
    let summary = format!("{} hits found in {}ms", total, time);

    if hits.is_empty() {
        return summary;
    }

    let columns: Vec<String> = columns(&hits)
        .into_iter()
        .filter(|column| !column.starts_with('_'))
        .collect();
    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for hit in &hits {
        // show the highlighted and cropped values when the server computed them
        let formatted = hit.get("_formatted").and_then(Value::as_object);
        builder.push_record(columns.iter().map(|column| {
            formatted
                .and_then(|formatted| formatted.get(column))
                .or_else(|| hit.get(column))
                .map_or_else(String::new, render_cell)
        }));
    }
    let table = builder.build().with(Style::rounded()).to_string();
    format!("{table}\n{summary}")
}

impl Meilisearch {
    fn search(&self, index: &str, query: &str, params: &SearchParameters) -> Result<()> {
        let body = search_body(query, params);
        let response = self.send(
            self.post(format!("{}/indexes/{}/search", self.addr, index))
                .json(&body),
            "Searching...",
        )?;
        if self.raw {
            return self.display("Search Results", &response);
        }
        println!("{}", render_hits(&response));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn only_given_parameters_are_sent() {
        let params = SearchParameters {
            limit: Some(5),
            filter: Some("genre = Drama".to_string()),
            attributes_to_highlight: vec!["title".to_string()],
            show_matches_position: true,
            ..SearchParameters::default()
        };
        assert_eq!(
            Value::Object(search_body("carol", &params)),
            json!({
                "q": "carol",
                "limit": 5,
                "filter": "genre = Drama",
                "attributesToHighlight": ["title"],
                "showMatchesPosition": true,
            })
        );
    }

    #[test]
    fn empty_search() {
        assert_eq!(
            Value::Object(search_body("", &SearchParameters::default())),
            json!({})
        );
    }

    #[test]
    fn hits_table() {
        let response = json!({
            "hits": [
                { "id": 1, "title": "Carol", "_formatted": { "id": "1", "title": "<em>Carol</em>" } },
                { "id": 2, "title": "Wonder Woman", "genre": "Action" },
            ],
            "query": "carol",
            "processingTimeMs": 3,
            "estimatedTotalHits": 2,
        });
        let rendered = render_hits(&response);
        assert!(rendered.contains("<em>Carol</em>"));
        assert!(rendered.contains("Wonder Woman"));
        assert!(rendered.contains("genre"));
        assert!(!rendered.contains("_formatted"));
        assert!(rendered.ends_with("2 hits found in 3ms"));
    }

    #[test]
    fn no_hits() {
        let response = json!({ "hits": [], "nbHits": 0, "processingTimeMs": 1 });
        assert_eq!(render_hits(&response), "0 hits found in 1ms");
    }
}
