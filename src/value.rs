//! Conversions from pages, talks, and frontmatter into [`Value`]s for
//! templating.

use crate::page::PageRecord;
use crate::talk::{Result, TalkView};
use gtmpl_value::Value;
use serde_yaml::Value as Yaml;
use std::collections::HashMap;
use url::Url;

/// Converts a frontmatter value into a template value. Mapping keys which
/// aren't strings are rendered as their YAML text.
pub fn from_yaml(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .map(|(k, v)| (key_string(k), from_yaml(v)))
                .collect(),
        ),
    }
}

fn key_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_start_matches("---").trim().to_owned())
            .unwrap_or_default(),
    }
}

/// Renders a scalar frontmatter value as display text (e.g., for a talk
/// title in a listing). Strings are returned as-is; other values as YAML.
fn display_string(yaml: &Yaml) -> String {
    match yaml {
        Yaml::String(s) => s.clone(),
        Yaml::Null => String::new(),
        other => key_string(other),
    }
}

/// Converts a [`PageRecord`] into a [`Value::Object`] with fields `url`,
/// `permalink`, `body`, and `meta` (the frontmatter).
pub fn page_value(page: &PageRecord, site_root: &Url) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("url".to_owned(), Value::String(page.path.clone()));
    m.insert(
        "permalink".to_owned(),
        match site_root.join(page.path.trim_start_matches('/')) {
            Ok(url) => Value::String(url.to_string()),
            Err(_) => Value::Nil,
        },
    );
    m.insert("body".to_owned(), Value::String(page.body.clone()));
    m.insert(
        "meta".to_owned(),
        Value::Object(
            page.metadata
                .iter()
                .map(|(k, v)| (k.clone(), from_yaml(v)))
                .collect(),
        ),
    );
    Value::Object(m)
}

/// Converts a [`TalkView`] into a [`Value::Object`] with fields `url` and
/// `title`. Fails if the talk has no title.
pub fn talk_value(talk: &TalkView) -> Result<Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("url".to_owned(), Value::String(talk.url().to_owned()));
    m.insert("title".to_owned(), Value::String(display_string(talk.title()?)));
    Ok(Value::Object(m))
}

/// Converts a talk listing into a [`Value::Array`], failing on the first
/// talk without a title.
pub fn talks_value(talks: &[TalkView]) -> Result<Value> {
    Ok(Value::Array(
        talks.iter().map(talk_value).collect::<Result<Vec<Value>>>()?,
    ))
}
