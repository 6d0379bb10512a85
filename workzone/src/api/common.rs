//! Common serde helpers for the Bitbucket and Workzone APIs

use serde::{Deserialize, Deserializer};

/// Escape a value for use as one URL path segment
pub fn escape_path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn is_zero(value: &i64) -> bool {
    *value == 0
}

pub fn is_false(value: &bool) -> bool {
    !*value
}

/// Workzone answers GETs with an array of policies, except for endpoints that
/// return a single bare object. Both decode to a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Decode a list of policies from a GET response body
pub fn decode_policies<T>(body: &str) -> Result<Vec<T>, serde_json::Error>
where
    T: for<'de> Deserialize<'de>,
{
    let mut de = serde_json::Deserializer::from_str(body);
    let items = one_or_many(&mut de)?;
    de.end()?;
    Ok(items)
}

/// Accepts `"50"`, `50` or null
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) => s,
        Some(StringOrNumber::Int(n)) => n.to_string(),
        Some(StringOrNumber::Float(n)) => n.to_string(),
        None => String::new(),
    })
}
