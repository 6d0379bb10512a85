//! bitbucketserver_workzone_workflow

use async_trait::async_trait;
use tfplug::{AttributeBuilder, Attributes, ResourceModel, Schema, SchemaBuilder};

use crate::api::workzone::WorkflowSettings;
use crate::api::{ApiError, UserResolver};
use crate::reconcile::{KeyArity, PolicyConfig, PolicyKey, ReconcileError};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPolicy {
    pub project: String,
    pub repository: String,
    pub allow_push_after_pr: bool,
    pub unapprove_pr_after_source_change: bool,
    pub unapprove_pr_after_target_change: bool,
    pub enforce_merge_condition: bool,
}

impl ResourceModel for WorkflowPolicy {
    fn from_attributes(attrs: &Attributes) -> tfplug::Result<Self> {
        Ok(Self {
            project: attrs.get_string("project")?,
            repository: attrs.get_string("repository")?,
            allow_push_after_pr: attrs.get_bool_or("allow_push_after_pr", true)?,
            unapprove_pr_after_source_change: attrs
                .get_bool_or("unapprove_pr_after_source_change", false)?,
            unapprove_pr_after_target_change: attrs
                .get_bool_or("unapprove_pr_after_target_change", false)?,
            enforce_merge_condition: attrs.get_bool_or("enforce_merge_condition", true)?,
        })
    }

    fn write_attributes(&self, attrs: &mut Attributes) {
        attrs.set_string("project", self.project.as_str());
        attrs.set_string("repository", self.repository.as_str());
        attrs.set_bool("allow_push_after_pr", self.allow_push_after_pr);
        attrs.set_bool(
            "unapprove_pr_after_source_change",
            self.unapprove_pr_after_source_change,
        );
        attrs.set_bool(
            "unapprove_pr_after_target_change",
            self.unapprove_pr_after_target_change,
        );
        attrs.set_bool("enforce_merge_condition", self.enforce_merge_condition);
    }
}

#[async_trait]
impl PolicyConfig for WorkflowPolicy {
    type Payload = WorkflowSettings;

    const TYPE_NAME: &'static str = "bitbucketserver_workzone_workflow";
    const KIND: &'static str = "workflow";
    const ARITY: KeyArity = KeyArity::Repository;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages the Workzone workflow policy of a repository")
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
                AttributeBuilder::bool("allow_push_after_pr")
                    .description("Allow pushes to a branch with an open pull request")
                    .default_value(true)
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("unapprove_pr_after_source_change")
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("unapprove_pr_after_target_change")
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("enforce_merge_condition")
                    .default_value(true)
                    .build(),
            )
            .build()
    }

    fn key(&self) -> Result<PolicyKey, ReconcileError> {
        PolicyKey::new(&self.project, &self.repository, None)
    }

    async fn to_payload(&self, _users: &dyn UserResolver) -> Result<WorkflowSettings, ApiError> {
        Ok(WorkflowSettings {
            project_key: self.project.clone(),
            repo_slug: self.repository.clone(),
            push_after_pull_req: self.allow_push_after_pr,
            unapprove_pull_req: self.unapprove_pr_after_source_change,
            unapprove_pull_req_target_ref_change: self.unapprove_pr_after_target_change,
            enable_merge_condition_veto: self.enforce_merge_condition,
        })
    }

    fn reconcile(&mut self, remote: WorkflowSettings) {
        self.allow_push_after_pr = remote.push_after_pull_req;
        self.unapprove_pr_after_source_change = remote.unapprove_pull_req;
        self.unapprove_pr_after_target_change = remote.unapprove_pull_req_target_ref_change;
        self.enforce_merge_condition = remote.enable_merge_condition_veto;
    }
}
