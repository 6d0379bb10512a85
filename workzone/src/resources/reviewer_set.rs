//! Reviewer lists shared by repository level and file path reviewers

use tfplug::Attributes;

use crate::api::workzone::ReviewerAssignment;
use crate::api::{ApiError, User, UserResolver};

/// Attribute names of the four reviewer lists in one block
pub struct ReviewerFields {
    pub users: &'static str,
    pub groups: &'static str,
    pub mandatory_users: &'static str,
    pub mandatory_groups: &'static str,
}

pub const REPOSITORY_REVIEWER_FIELDS: ReviewerFields = ReviewerFields {
    users: "repository_reviewers_users",
    groups: "repository_reviewers_groups",
    mandatory_users: "mandatory_repository_reviewers_users",
    mandatory_groups: "mandatory_repository_reviewers_groups",
};

pub const FILEPATH_REVIEWER_FIELDS: ReviewerFields = ReviewerFields {
    users: "filepath_reviewers_users",
    groups: "filepath_reviewers_groups",
    mandatory_users: "mandatory_filepath_reviewers_users",
    mandatory_groups: "mandatory_filepath_reviewers_groups",
};

/// Reviewers as configured: usernames and group names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewerNames {
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub mandatory_users: Vec<String>,
    pub mandatory_groups: Vec<String>,
}

impl ReviewerNames {
    pub fn from_attributes(attrs: &Attributes, fields: &ReviewerFields) -> tfplug::Result<Self> {
        Ok(Self {
            users: attrs.get_string_list(fields.users)?,
            groups: attrs.get_string_list(fields.groups)?,
            mandatory_users: attrs.get_string_list(fields.mandatory_users)?,
            mandatory_groups: attrs.get_string_list(fields.mandatory_groups)?,
        })
    }

    pub fn write_attributes(&self, attrs: &mut Attributes, fields: &ReviewerFields) {
        attrs.set_string_list(fields.users, self.users.iter().cloned());
        attrs.set_string_list(fields.groups, self.groups.iter().cloned());
        attrs.set_string_list(fields.mandatory_users, self.mandatory_users.iter().cloned());
        attrs.set_string_list(fields.mandatory_groups, self.mandatory_groups.iter().cloned());
    }

    /// Resolve usernames to user records. Stops at the first unknown user.
    pub async fn resolve(&self, resolver: &dyn UserResolver) -> Result<ReviewerAssignment, ApiError> {
        let users = resolve_users(&self.users, resolver).await?;
        let groups = self.groups.clone();
        let mandatory_users = resolve_users(&self.mandatory_users, resolver).await?;
        let mandatory_groups = self.mandatory_groups.clone();

        Ok(ReviewerAssignment {
            users,
            groups,
            mandatory_users,
            mandatory_groups,
        })
    }
}

impl From<ReviewerAssignment> for ReviewerNames {
    fn from(assignment: ReviewerAssignment) -> Self {
        Self {
            users: user_names(assignment.users),
            groups: assignment.groups,
            mandatory_users: user_names(assignment.mandatory_users),
            mandatory_groups: assignment.mandatory_groups,
        }
    }
}

pub async fn resolve_users(
    names: &[String],
    resolver: &dyn UserResolver,
) -> Result<Vec<User>, ApiError> {
    let mut users = Vec::with_capacity(names.len());
    for name in names {
        users.push(resolver.resolve(name).await?);
    }
    Ok(users)
}

pub fn user_names(users: Vec<User>) -> Vec<String> {
    users.into_iter().map(|u| u.name).collect()
}
