//! Composite policy identifiers
//!
//! A policy is keyed by project and repository, plus a ref name for branch
//! level policies. The key is persisted as the parts joined with `|`.

use std::fmt;
use tfplug::Attributes;

use super::error::ReconcileError;

pub const ID_SEPARATOR: char = '|';

pub const ATTR_PROJECT: &str = "project";
pub const ATTR_REPOSITORY: &str = "repository";
pub const ATTR_REFNAME: &str = "refname";

/// Number of parts in an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyArity {
    Repository = 2,
    Branch = 3,
}

impl KeyArity {
    pub fn parts(self) -> usize {
        self as usize
    }

    /// Human readable identifier format, used in error messages
    pub fn format(self) -> &'static str {
        match self {
            KeyArity::Repository => "project|repository",
            KeyArity::Branch => "project|repository|refname",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyKey {
    pub project: String,
    pub repository: String,
    pub ref_name: Option<String>,
}

impl PolicyKey {
    /// Build a key from configured values
    ///
    /// Fields containing the separator would produce an identifier that no
    /// longer parses back, so they are rejected.
    pub fn new(
        project: &str,
        repository: &str,
        ref_name: Option<&str>,
    ) -> Result<Self, ReconcileError> {
        let mut fields = vec![(ATTR_PROJECT, project), (ATTR_REPOSITORY, repository)];
        if let Some(ref_name) = ref_name {
            fields.push((ATTR_REFNAME, ref_name));
        }

        for (attribute, value) in fields {
            if value.is_empty() || value.contains(ID_SEPARATOR) {
                return Err(ReconcileError::InvalidKey {
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            project: project.to_string(),
            repository: repository.to_string(),
            ref_name: ref_name.map(str::to_string),
        })
    }

    /// Split a persisted identifier
    pub fn parse(id: &str, arity: KeyArity) -> Result<Self, ReconcileError> {
        let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();

        if parts.len() != arity.parts() || parts.iter().any(|p| p.is_empty()) {
            return Err(ReconcileError::InvalidId {
                id: id.to_string(),
                expected: arity.format(),
            });
        }

        Ok(Self {
            project: parts[0].to_string(),
            repository: parts[1].to_string(),
            ref_name: parts.get(2).map(|s| s.to_string()),
        })
    }

    /// Read the key fields from configuration
    pub fn from_attributes(attrs: &Attributes, arity: KeyArity) -> Result<Self, ReconcileError> {
        let project = attrs.get_string(ATTR_PROJECT)?;
        let repository = attrs.get_string(ATTR_REPOSITORY)?;
        let ref_name = match arity {
            KeyArity::Branch => Some(attrs.get_string(ATTR_REFNAME)?),
            KeyArity::Repository => None,
        };

        Self::new(&project, &repository, ref_name.as_deref())
    }

    pub fn write_to(&self, attrs: &mut Attributes) {
        attrs.set_string(ATTR_PROJECT, self.project.as_str());
        attrs.set_string(ATTR_REPOSITORY, self.repository.as_str());
        if let Some(ref_name) = &self.ref_name {
            attrs.set_string(ATTR_REFNAME, ref_name.as_str());
        }
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.project, ID_SEPARATOR, self.repository)?;
        if let Some(ref_name) = &self.ref_name {
            write!(f, "{}{}", ID_SEPARATOR, ref_name)?;
        }
        Ok(())
    }
}
