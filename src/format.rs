use miette::{IntoDiagnostic, Result};
use reqwest::blocking::Response;
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};
use termion::{color, style};

pub fn write_response_headers(response: &Response, verbose: usize) -> Result<()> {
    if verbose < 1 {
        return Ok(());
    }
    let colored = atty::is(atty::Stream::Stderr);

    if colored {
        eprint!("{}", color::Fg(color::Cyan));
    }

    eprintln!("{} {}", response.status(), response.url());
    for (key, value) in response.headers() {
        eprintln!("{}: {:?}", key, value);
    }

    if colored {
        eprintln!("{}", color::Fg(color::Reset));
    }
    Ok(())
}

pub fn write_json(response: &Value) -> Result<()> {
    if atty::is(atty::Stream::Stdout) {
        println!(
            "{}",
            colored_json::to_colored_json_auto(response).into_diagnostic()?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(response).into_diagnostic()?
        );
    }
    Ok(())
}

pub fn write_panel(title: &str, value: &Value) -> Result<()> {
    println!("{}", render_title(title, atty::is(atty::Stream::Stdout)));
    println!("{}", render_panel(value));
    Ok(())
}

/// Prints a line of text, styled as success on a terminal.
pub fn write_success(message: &str) {
    if atty::is(atty::Stream::Stdout) {
        println!(
            "{}{}{}",
            color::Fg(color::Green),
            message,
            color::Fg(color::Reset)
        );
    } else {
        println!("{message}");
    }
}

fn render_title(title: &str, colored: bool) -> String {
    if colored {
        format!(
            "{}{}{}{}",
            style::Bold,
            color::Fg(color::LightBlue),
            title,
            style::Reset
        )
    } else {
        title.to_string()
    }
}

/// Renders an object as a two columns table, an array of objects as a table
/// with one column per key and anything else as a single cell.
pub fn render_panel(value: &Value) -> String {
    let mut builder = Builder::default();
    match value {
        Value::Object(object) => {
            for (key, value) in object {
                builder.push_record([key.clone(), render_cell(value)]);
            }
        }
        Value::Array(array) if !array.is_empty() && array.iter().all(Value::is_object) => {
            let objects: Vec<&Map<String, Value>> =
                array.iter().filter_map(Value::as_object).collect();
            let columns = columns(&objects);
            builder.push_record(columns.iter().cloned());
            for object in objects {
                builder.push_record(
                    columns
                        .iter()
                        .map(|column| object.get(column).map_or_else(String::new, render_cell)),
                );
            }
        }
        other => builder.push_record([render_cell(other)]),
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Every key of `objects`, in the order they are first seen.
pub fn columns(objects: &[&Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for object in objects {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(array) if array.iter().all(|v| !v.is_object() && !v.is_array()) => array
            .iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn panel_of_an_object() {
        let panel = render_panel(&json!({ "uid": "movies", "primaryKey": null, "size": 12 }));
        assert!(panel.contains("uid"));
        assert!(panel.contains("movies"));
        assert!(panel.contains("primaryKey"));
        assert!(panel.contains("None"));
        assert!(panel.contains("12"));
        let uid = panel.find("uid").unwrap();
        let size = panel.find("size").unwrap();
        assert!(uid < size);
    }

    #[test]
    fn panel_of_documents() {
        let panel = render_panel(&json!([
            { "id": 1, "title": "Carol" },
            { "id": 2, "genre": "Drama" },
        ]));
        let header = panel.lines().nth(1).unwrap();
        let id = header.find("id").unwrap();
        let title = header.find("title").unwrap();
        let genre = header.find("genre").unwrap();
        assert!(id < title && title < genre);
        assert!(panel.contains("Carol"));
        assert!(panel.contains("Drama"));
    }

    #[test]
    fn cells() {
        assert_eq!(render_cell(&json!("Carol")), "Carol");
        assert_eq!(render_cell(&json!(["title", "genre"])), "title, genre");
        assert_eq!(render_cell(&json!(null)), "None");
        assert_eq!(render_cell(&json!(true)), "true");
        assert_eq!(render_cell(&json!({ "a": 1 })), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn uncolored_title() {
        assert_eq!(render_title("Index", false), "Index");
        assert!(render_title("Index", true).contains("Index"));
    }
}
