//! Resource data: the attribute store exchanged with Terraform
//!
//! `Attributes` holds the configuration or state values of one resource (or
//! one nested block) keyed by attribute name. `ResourceData` pairs those
//! values with the resource ID. Typed getters return errors instead of
//! panicking so providers can surface bad input as diagnostics.

use crate::error::{Result, TfplugError};
use crate::types::Dynamic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: HashMap<String, Dynamic>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build attributes from a JSON object, mostly useful in tests
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn get(&self, name: &str) -> Option<&Dynamic> {
        self.values.get(name)
    }

    /// True if the attribute is present and not null
    pub fn is_set(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Dynamic>) {
        self.values.insert(name.to_string(), value.into());
    }

    fn require(&self, name: &str) -> Result<&Dynamic> {
        match self.values.get(name) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(TfplugError::AttributeNotFound(name.to_string())),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        let value = self.require(name)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TfplugError::type_mismatch(name, "string", value.type_name()))
    }

    /// Missing or null strings read as empty, the zero value Terraform uses
    pub fn get_string_or_empty(&self, name: &str) -> Result<String> {
        if !self.is_set(name) {
            return Ok(String::new());
        }
        self.get_string(name)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| TfplugError::type_mismatch(name, "bool", value.type_name()))
    }

    /// Missing or null bools read as `default`
    pub fn get_bool_or(&self, name: &str, default: bool) -> Result<bool> {
        if !self.is_set(name) {
            return Ok(default);
        }
        self.get_bool(name)
    }

    pub fn get_int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        match value.as_number() {
            Some(n) if n.fract() == 0.0 => Ok(n as i64),
            Some(_) => Err(TfplugError::type_mismatch(name, "whole number", "number")),
            None => Err(TfplugError::type_mismatch(
                name,
                "number",
                value.type_name(),
            )),
        }
    }

    /// Missing or null numbers read as zero
    pub fn get_int_or_zero(&self, name: &str) -> Result<i64> {
        if !self.is_set(name) {
            return Ok(0);
        }
        self.get_int(name)
    }

    /// Missing or null lists read as empty
    pub fn get_string_list(&self, name: &str) -> Result<Vec<String>> {
        if !self.is_set(name) {
            return Ok(Vec::new());
        }
        let value = self.require(name)?;
        let items = value
            .as_list()
            .ok_or_else(|| TfplugError::type_mismatch(name, "list", value.type_name()))?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    TfplugError::type_mismatch(name, "list of string", item.type_name())
                })
            })
            .collect()
    }

    /// Nested blocks declared with list nesting
    pub fn get_blocks(&self, name: &str) -> Result<Vec<Attributes>> {
        if !self.is_set(name) {
            return Ok(Vec::new());
        }
        let value = self.require(name)?;
        let items = value
            .as_list()
            .ok_or_else(|| TfplugError::type_mismatch(name, "list", value.type_name()))?;

        items
            .iter()
            .map(|item| {
                item.as_map()
                    .map(|map| Attributes {
                        values: map.clone(),
                    })
                    .ok_or_else(|| TfplugError::type_mismatch(name, "block", item.type_name()))
            })
            .collect()
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        self.insert(name, Dynamic::String(value.into()));
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.insert(name, Dynamic::Bool(value));
    }

    pub fn set_int(&mut self, name: &str, value: i64) {
        self.insert(name, Dynamic::from(value));
    }

    pub fn set_string_list<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = values
            .into_iter()
            .map(|s| Dynamic::String(s.into()))
            .collect();
        self.insert(name, Dynamic::List(list));
    }

    pub fn set_blocks(&mut self, name: &str, blocks: Vec<Attributes>) {
        let list = blocks
            .into_iter()
            .map(|block| Dynamic::Map(block.values))
            .collect();
        self.insert(name, Dynamic::List(list));
    }
}

impl From<HashMap<String, Dynamic>> for Attributes {
    fn from(values: HashMap<String, Dynamic>) -> Self {
        Self { values }
    }
}

/// Configuration and state of a single resource instance
///
/// An empty ID means the resource does not exist. Clearing the ID during a
/// read tells Terraform to drop the resource from state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    id: String,
    pub values: Attributes,
}

impl ResourceData {
    pub fn new(values: Attributes) -> Self {
        Self {
            id: String::new(),
            values,
        }
    }

    pub fn with_id(id: impl Into<String>, values: Attributes) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }
}

/// Conversion between a typed model and its attribute representation
pub trait ResourceModel: Sized {
    fn from_attributes(attrs: &Attributes) -> Result<Self>;

    fn write_attributes(&self, attrs: &mut Attributes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Attributes {
        Attributes::from_json(json!({
            "project": "TEST1",
            "count": 20,
            "ratio": 1.5,
            "enabled": false,
            "users": ["admin", "jdoe"],
            "empty": null,
            "blocks": [
                {"pattern": "**/11", "excludes": ["a"]},
                {"pattern": "**/22"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn typed_getters_read_values() {
        let attrs = sample();
        assert_eq!(attrs.get_string("project").unwrap(), "TEST1");
        assert_eq!(attrs.get_int("count").unwrap(), 20);
        assert!(!attrs.get_bool("enabled").unwrap());
        assert_eq!(attrs.get_string_list("users").unwrap(), vec!["admin", "jdoe"]);
    }

    #[test]
    fn missing_and_null_values() {
        let attrs = sample();
        assert!(matches!(
            attrs.get_string("empty"),
            Err(TfplugError::AttributeNotFound(_))
        ));
        assert!(matches!(
            attrs.get_bool("nope"),
            Err(TfplugError::AttributeNotFound(_))
        ));
        assert_eq!(attrs.get_string_or_empty("empty").unwrap(), "");
        assert_eq!(attrs.get_int_or_zero("nope").unwrap(), 0);
        assert!(attrs.get_bool_or("nope", true).unwrap());
        assert!(!attrs.get_bool_or("enabled", true).unwrap());
        assert!(attrs.get_string_list("nope").unwrap().is_empty());
        assert!(!attrs.is_set("empty"));
    }

    #[test]
    fn type_mismatches_are_reported() {
        let attrs = sample();
        let err = attrs.get_bool("project").unwrap_err();
        assert!(err.to_string().contains("expected bool, got string"));
        assert!(attrs.get_int("ratio").is_err());
        assert!(attrs.get_string_list("count").is_err());
    }

    #[test]
    fn blocks_round_trip_through_setters() {
        let attrs = sample();
        let blocks = attrs.get_blocks("blocks").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].get_string("pattern").unwrap(), "**/11");
        assert_eq!(blocks[0].get_string_list("excludes").unwrap(), vec!["a"]);
        assert!(blocks[1].get_string_list("excludes").unwrap().is_empty());

        let mut copy = Attributes::new();
        copy.set_blocks("blocks", blocks);
        assert_eq!(copy.get_blocks("blocks").unwrap()[1].get_string("pattern").unwrap(), "**/22");
    }

    #[test]
    fn resource_data_id_lifecycle() {
        let mut data = ResourceData::new(Attributes::new());
        assert!(!data.has_id());

        data.set_id("TEST1|repo");
        assert_eq!(data.id(), "TEST1|repo");

        data.clear_id();
        assert!(!data.has_id());
        assert_eq!(data.id(), "");
    }
}
