//! bitbucketserver_workzone_reviewers

use async_trait::async_trait;
use tfplug::{AttributeBuilder, Attributes, ResourceModel, Schema, SchemaBuilder};

use super::reviewer_set::{ReviewerFields, ReviewerNames, FILEPATH_REVIEWER_FIELDS, REPOSITORY_REVIEWER_FIELDS};
use crate::api::workzone::{FilePathReviewers, ReviewersSettings};
use crate::api::{ApiError, UserResolver};
use crate::reconcile::{KeyArity, PolicyConfig, PolicyKey, ReconcileError};

const DEFAULT_SUGGESTED_REVIEWERS_TIMESPAN: i64 = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewersPolicy {
    pub project: String,
    pub repository: String,
    pub refname: String,
    pub reviewers: ReviewerNames,
    pub suggested_reviewers: i64,
    pub suggested_reviewers_timespan: i64,
    pub filepath_reviewers: Vec<FilePathReviewersBlock>,
}

/// One `filepath_reviewers` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePathReviewersBlock {
    pub filepath_pattern: String,
    pub include_exclude_enabled: bool,
    pub exclude_filepaths: Vec<String>,
    pub reviewers: ReviewerNames,
}

impl FilePathReviewersBlock {
    fn from_attributes(attrs: &Attributes) -> tfplug::Result<Self> {
        Ok(Self {
            filepath_pattern: attrs.get_string("filepath_pattern")?,
            include_exclude_enabled: attrs.get_bool_or("include_exclude_enabled", false)?,
            exclude_filepaths: attrs.get_string_list("exclude_filepaths")?,
            reviewers: ReviewerNames::from_attributes(attrs, &FILEPATH_REVIEWER_FIELDS)?,
        })
    }

    fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.set_string("filepath_pattern", self.filepath_pattern.as_str());
        attrs.set_bool("include_exclude_enabled", self.include_exclude_enabled);
        attrs.set_string_list("exclude_filepaths", self.exclude_filepaths.iter().cloned());
        self.reviewers
            .write_attributes(&mut attrs, &FILEPATH_REVIEWER_FIELDS);
        attrs
    }

    async fn to_payload(&self, users: &dyn UserResolver) -> Result<FilePathReviewers, ApiError> {
        Ok(FilePathReviewers {
            file_path_pattern: self.filepath_pattern.clone(),
            include_exclude_enabled: self.include_exclude_enabled,
            exclude_file_paths: self.exclude_filepaths.clone(),
            reviewers: self.reviewers.resolve(users).await?,
        })
    }
}

impl From<FilePathReviewers> for FilePathReviewersBlock {
    fn from(remote: FilePathReviewers) -> Self {
        Self {
            filepath_pattern: remote.file_path_pattern,
            include_exclude_enabled: remote.include_exclude_enabled,
            exclude_filepaths: remote.exclude_file_paths,
            reviewers: remote.reviewers.into(),
        }
    }
}

fn reviewer_list_attributes(builder: SchemaBuilder, fields: &ReviewerFields) -> SchemaBuilder {
    builder
        .attribute(
            AttributeBuilder::string_list(fields.users)
                .description("Usernames of reviewers")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::string_list(fields.groups)
                .description("Group names of reviewers")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::string_list(fields.mandatory_users)
                .description("Usernames of mandatory reviewers")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::string_list(fields.mandatory_groups)
                .description("Group names of mandatory reviewers")
                .optional()
                .build(),
        )
}

impl ResourceModel for ReviewersPolicy {
    fn from_attributes(attrs: &Attributes) -> tfplug::Result<Self> {
        let filepath_reviewers = attrs
            .get_blocks("filepath_reviewers")?
            .iter()
            .map(FilePathReviewersBlock::from_attributes)
            .collect::<tfplug::Result<Vec<_>>>()?;

        let suggested_reviewers_timespan = if attrs.is_set("suggested_reviewers_timespan") {
            attrs.get_int("suggested_reviewers_timespan")?
        } else {
            DEFAULT_SUGGESTED_REVIEWERS_TIMESPAN
        };

        Ok(Self {
            project: attrs.get_string("project")?,
            repository: attrs.get_string("repository")?,
            refname: attrs.get_string("refname")?,
            reviewers: ReviewerNames::from_attributes(attrs, &REPOSITORY_REVIEWER_FIELDS)?,
            suggested_reviewers: attrs.get_int_or_zero("suggested_reviewers")?,
            suggested_reviewers_timespan,
            filepath_reviewers,
        })
    }

    fn write_attributes(&self, attrs: &mut Attributes) {
        attrs.set_string("project", self.project.as_str());
        attrs.set_string("repository", self.repository.as_str());
        attrs.set_string("refname", self.refname.as_str());
        self.reviewers
            .write_attributes(attrs, &REPOSITORY_REVIEWER_FIELDS);
        attrs.set_int("suggested_reviewers", self.suggested_reviewers);
        attrs.set_int("suggested_reviewers_timespan", self.suggested_reviewers_timespan);
        attrs.set_blocks(
            "filepath_reviewers",
            self.filepath_reviewers
                .iter()
                .map(FilePathReviewersBlock::to_attributes)
                .collect(),
        );
    }
}

#[async_trait]
impl PolicyConfig for ReviewersPolicy {
    type Payload = ReviewersSettings;

    const TYPE_NAME: &'static str = "bitbucketserver_workzone_reviewers";
    const KIND: &'static str = "reviewers";
    const ARITY: KeyArity = KeyArity::Branch;

    fn schema() -> Schema {
        let builder = SchemaBuilder::new()
            .version(0)
            .description("Manages the Workzone reviewers policy of a branch")
            .attribute(
                AttributeBuilder::string("project")
                    .description("Project key")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("repository")
                    .description("Repository slug")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("refname")
                    .description("Target branch or branch pattern")
                    .required()
                    .force_new()
                    .build(),
            );

        let filepath_block = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::string("filepath_pattern")
                    .description("Glob matched against changed files")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("include_exclude_enabled")
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_list("exclude_filepaths")
                    .optional()
                    .build(),
            );

        reviewer_list_attributes(builder, &REPOSITORY_REVIEWER_FIELDS)
            .attribute(
                AttributeBuilder::number("suggested_reviewers")
                    .description("Number of suggested reviewers")
                    .default_value(0_i64)
                    .build(),
            )
            .attribute(
                AttributeBuilder::number("suggested_reviewers_timespan")
                    .description("Days of history used to suggest reviewers")
                    .default_value(DEFAULT_SUGGESTED_REVIEWERS_TIMESPAN)
                    .build(),
            )
            .list_block(
                "filepath_reviewers",
                reviewer_list_attributes(filepath_block, &FILEPATH_REVIEWER_FIELDS),
            )
            .build()
    }

    fn key(&self) -> Result<PolicyKey, ReconcileError> {
        PolicyKey::new(&self.project, &self.repository, Some(&self.refname))
    }

    async fn to_payload(&self, users: &dyn UserResolver) -> Result<ReviewersSettings, ApiError> {
        let reviewers = self.reviewers.resolve(users).await?;

        let mut file_path_reviewers = Vec::with_capacity(self.filepath_reviewers.len());
        for block in &self.filepath_reviewers {
            file_path_reviewers.push(block.to_payload(users).await?);
        }

        Ok(ReviewersSettings {
            project_key: self.project.clone(),
            repo_slug: self.repository.clone(),
            ref_name: self.refname.clone(),
            reviewers,
            top_suggested_reviewers: self.suggested_reviewers,
            days_in_past: self.suggested_reviewers_timespan,
            file_path_reviewers,
        })
    }

    fn reconcile(&mut self, remote: ReviewersSettings) {
        self.reviewers = remote.reviewers.into();
        self.suggested_reviewers = remote.top_suggested_reviewers;
        self.suggested_reviewers_timespan = remote.days_in_past;
        self.filepath_reviewers = remote
            .file_path_reviewers
            .into_iter()
            .map(FilePathReviewersBlock::from)
            .collect();
    }
}
