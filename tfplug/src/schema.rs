//! Schema types and builders for tfplug
//!
//! A schema describes the attributes and nested blocks of a resource. Besides
//! documenting the resource it does two jobs at the provider boundary: it
//! fills in static defaults for unset optional attributes, and it checks that
//! required attributes are present with the right type.

use crate::resource_data::Attributes;
use crate::types::{AttributePath, Diagnostic, Dynamic};

/// AttributeType defines the subset of Terraform's type system used here
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
}

impl AttributeType {
    fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(inner), Dynamic::List(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            _ => false,
        }
    }

    fn name(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Number => "number".to_string(),
            AttributeType::Bool => "bool".to_string(),
            AttributeType::List(inner) => format!("list({})", inner.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub sensitive: bool,
    /// Changing the value forces the resource to be replaced
    pub force_new: bool,
    pub default: Option<Dynamic>,
}

/// Nested block with list nesting, e.g. repeated `filepath_reviewers { ... }`
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub min_items: usize,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Schema {
    /// Increment when schema changes require state migration
    pub version: i64,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    /// Fill unset optional attributes with their static defaults
    pub fn apply_defaults(&self, attrs: &mut Attributes) {
        self.block.apply_defaults(attrs);
    }

    /// Check required attributes, attribute types and block counts
    pub fn validate(&self, attrs: &Attributes) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block
            .validate(attrs, &AttributePath::default(), &mut diagnostics);
        diagnostics
    }
}

impl Block {
    fn apply_defaults(&self, attrs: &mut Attributes) {
        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                if !attrs.is_set(&attr.name) {
                    attrs.insert(&attr.name, default.clone());
                }
            }
        }

        for nested in &self.block_types {
            // Malformed blocks are left alone for validate() to report
            if let Ok(mut blocks) = attrs.get_blocks(&nested.type_name) {
                if blocks.is_empty() {
                    continue;
                }
                for block in blocks.iter_mut() {
                    nested.block.apply_defaults(block);
                }
                attrs.set_blocks(&nested.type_name, blocks);
            }
        }
    }

    fn validate(&self, attrs: &Attributes, base: &AttributePath, diags: &mut Vec<Diagnostic>) {
        let path_for = |name: &str| {
            if base.steps.is_empty() {
                AttributePath::new(name)
            } else {
                base.clone().attribute(name)
            }
        };

        for attr in &self.attributes {
            match attrs.get(&attr.name) {
                Some(value) if !value.is_null() => {
                    if !attr.r#type.accepts(value) {
                        diags.push(
                            Diagnostic::error(
                                "Incorrect attribute value type",
                                format!(
                                    "Attribute '{}' must be {}, got {}",
                                    attr.name,
                                    attr.r#type.name(),
                                    value.type_name()
                                ),
                            )
                            .with_attribute(path_for(&attr.name)),
                        );
                    }
                }
                _ if attr.required => {
                    diags.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("The argument '{}' is required", attr.name),
                        )
                        .with_attribute(path_for(&attr.name)),
                    );
                }
                _ => {}
            }
        }

        for nested in &self.block_types {
            let path = path_for(&nested.type_name);
            let blocks = match attrs.get_blocks(&nested.type_name) {
                Ok(blocks) => blocks,
                Err(e) => {
                    diags.push(
                        Diagnostic::error("Invalid block", e.to_string()).with_attribute(path),
                    );
                    continue;
                }
            };

            if blocks.len() < nested.min_items
                || nested.max_items.is_some_and(|max| blocks.len() > max)
            {
                diags.push(
                    Diagnostic::error(
                        "Invalid number of blocks",
                        format!(
                            "Block '{}' has {} items, allowed range is {}..{}",
                            nested.type_name,
                            blocks.len(),
                            nested.min_items,
                            nested
                                .max_items
                                .map(|m| m.to_string())
                                .unwrap_or_default()
                        ),
                    )
                    .with_attribute(path.clone()),
                );
            }

            for (idx, block) in blocks.iter().enumerate() {
                nested
                    .block
                    .validate(block, &path.clone().index(idx as i64), diags);
            }
        }
    }
}

/// Builder for attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                sensitive: false,
                force_new: false,
                default: None,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    /// Static default; implies optional
    pub fn default_value(mut self, value: impl Into<Dynamic>) -> Self {
        self.attribute.default = Some(value.into());
        self.optional()
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Builder for schemas and nested blocks
pub struct SchemaBuilder {
    version: i64,
    block: Block,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            version: 0,
            block: Block::default(),
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.block.attributes.push(attr);
        self
    }

    /// Add a list-nested block built from another builder's attributes
    pub fn list_block(mut self, type_name: &str, nested: SchemaBuilder) -> Self {
        self.block.block_types.push(NestedBlock {
            type_name: type_name.to_string(),
            block: nested.block,
            min_items: 0,
            max_items: None,
        });
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            block: self.block,
        }
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
