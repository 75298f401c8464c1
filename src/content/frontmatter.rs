//! Front-matter parsing and normalization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

use super::PostMetadata;
use crate::error::Result;
use crate::helpers::{parse_date_string, to_iso};

/// Title given to posts whose frontmatter has none
pub const UNTITLED: &str = "未命名";

/// Keys owned by [`PostMetadata`]; everything else lands in `extra`
const KNOWN_KEYS: [&str; 8] = [
    "title",
    "description",
    "pubDate",
    "updatedDate",
    "categories",
    "category",
    "tags",
    "draft",
];

/// A frontmatter field that authors write either as a single string or as
/// a list
#[derive(Debug, Clone, PartialEq)]
pub enum LooseList {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for LooseList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, SeqAccess, Visitor};
        use std::fmt;

        struct LooseListVisitor;

        impl<'de> Visitor<'de> for LooseListVisitor {
            type Value = LooseList;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or a list of strings")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::One(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::One(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::One(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::One(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::One(value.to_string()))
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::One(value.to_string()))
            }

            fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
            where
                S: SeqAccess<'de>,
            {
                // Scalars are stringified; nulls and nested structures dropped
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<Value>()? {
                    if let Some(text) = scalar_to_string(&item) {
                        items.push(text);
                    }
                }
                Ok(LooseList::Many(items))
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::Many(Vec::new()))
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(LooseList::Many(Vec::new()))
            }
        }

        deserializer.deserialize_any(LooseListVisitor)
    }
}

impl LooseList {
    /// Read a raw frontmatter value; maps and tagged values yield `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_yaml::from_value(value.clone()).ok()
    }

    /// Tokens of the list; a single string is split on `,` and `，`
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            LooseList::One(text) => text.split([',', '，']).map(str::to_string).collect(),
            LooseList::Many(items) => items,
        }
    }
}

/// Split a document into its YAML frontmatter block and body
///
/// The block must open on the first line with `---` and close with a line
/// that is exactly `---`. The body is returned byte-for-byte.
pub fn split_document(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text.strip_prefix("---") else {
        return (None, text);
    };
    let Some(rest) = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    // No closing ---, treat as no front-matter
    (None, text)
}

/// Parse a document into its raw frontmatter mapping and body
///
/// Frontmatter that is not a YAML mapping is logged and the whole text is
/// treated as body.
pub fn parse_document(text: &str) -> (Mapping, &str) {
    let (yaml, body) = match split_document(text) {
        (Some(yaml), body) => (yaml, body),
        (None, body) => return (Mapping::new(), body),
    };

    if yaml.trim().is_empty() {
        return (Mapping::new(), body);
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => (mapping, body),
        Ok(Value::Null) => (Mapping::new(), body),
        Ok(other) => {
            tracing::warn!(
                "Front-matter is not a mapping ({:?}), treating as content",
                kind_of(&other)
            );
            (Mapping::new(), text)
        }
        Err(e) => {
            tracing::warn!("Failed to parse YAML front-matter, treating as content: {}", e);
            (Mapping::new(), text)
        }
    }
}

/// Turn raw frontmatter into canonical metadata
///
/// Never fails: every field has a fallback, and `now` stands in for a
/// missing or unreadable `pubDate`.
pub fn normalize(raw: &Mapping, now: DateTime<Utc>) -> PostMetadata {
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNTITLED.to_string());

    let description = raw
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string);

    let pub_date = raw.get("pubDate").and_then(date_value).unwrap_or(now);
    let updated_date = raw.get("updatedDate").and_then(date_value);

    let mut tokens = Vec::new();
    if let Some(list) = raw.get("categories").and_then(LooseList::from_value) {
        tokens.extend(list.into_tokens());
    }
    match raw.get("category") {
        Some(Value::String(category)) => {
            if !category.trim().is_empty() {
                tokens.push(category.clone());
            }
        }
        Some(other) => {
            if let Some(LooseList::Many(items)) = LooseList::from_value(other) {
                tokens.extend(items);
            }
        }
        None => {}
    }
    if let Some(list) = raw.get("tags").and_then(LooseList::from_value) {
        tokens.extend(list.into_tokens());
    }

    let draft = raw.get("draft").map(truthy).unwrap_or(false);

    let extra = raw
        .iter()
        .filter(|(key, _)| !key.as_str().is_some_and(|k| KNOWN_KEYS.contains(&k)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    PostMetadata {
        title,
        description,
        pub_date,
        updated_date,
        categories: canonical_categories(tokens),
        draft,
        extra,
    }
}

/// Trim, drop empty entries and deduplicate, keeping first-seen order
pub fn canonical_categories<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut categories: Vec<String> = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        if !token.is_empty() && !categories.iter().any(|c| c == token) {
            categories.push(token.to_string());
        }
    }
    categories
}

impl PostMetadata {
    /// Frontmatter mapping in canonical key order
    ///
    /// `categories` is omitted when empty; legacy keys never appear.
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.insert(key("title"), Value::String(self.title.clone()));
        if let Some(description) = &self.description {
            mapping.insert(key("description"), Value::String(description.clone()));
        }
        mapping.insert(key("pubDate"), Value::String(to_iso(&self.pub_date)));
        if let Some(updated) = &self.updated_date {
            mapping.insert(key("updatedDate"), Value::String(to_iso(updated)));
        }
        if !self.categories.is_empty() {
            let categories = self
                .categories
                .iter()
                .map(|c| Value::String(c.clone()))
                .collect();
            mapping.insert(key("categories"), Value::Sequence(categories));
        }
        mapping.insert(key("draft"), Value::Bool(self.draft));
        for (k, v) in &self.extra {
            mapping.insert(k.clone(), v.clone());
        }
        mapping
    }
}

/// Serialize metadata as a frontmatter block followed by `body` unchanged
pub fn render_document(meta: &PostMetadata, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(&meta.to_mapping())?;
    Ok(format!("---\n{}---\n{}", yaml, body))
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

pub(super) fn date_value(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_date_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Loose boolean cast used for `draft`
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            !matches!(s.as_str(), "" | "false" | "no" | "off" | "0")
        }
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => true,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
