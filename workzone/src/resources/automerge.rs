//! bitbucketserver_workzone_automerge

use async_trait::async_trait;
use tfplug::{AttributeBuilder, Attributes, ResourceModel, Schema, SchemaBuilder};

use super::reviewer_set::{resolve_users, user_names};
use crate::api::workzone::AutomergeSettings;
use crate::api::{ApiError, UserResolver};
use crate::reconcile::{KeyArity, PolicyConfig, PolicyKey, ReconcileError};

#[derive(Debug, Clone, PartialEq)]
pub struct AutomergePolicy {
    pub project: String,
    pub repository: String,
    pub refname: String,
    pub source_refname: String,
    pub merge_condition: String,
    pub merge_strategy_id: String,
    pub approval_quota_enabled: bool,
    pub approval_quota: String,
    pub approval_count: i64,
    pub mandatory_approval_count: i64,
    pub group_quota: i64,
    pub delete_source_branch: bool,
    pub watch_build_result: bool,
    pub watch_task_completion: bool,
    pub required_signatures: i64,
    pub required_builds: i64,
    pub ignore_contributing_reviewers_approval: bool,
    pub enable_needs_work_veto: bool,
    pub automerge_users: Vec<String>,
}

impl ResourceModel for AutomergePolicy {
    fn from_attributes(attrs: &Attributes) -> tfplug::Result<Self> {
        Ok(Self {
            project: attrs.get_string("project")?,
            repository: attrs.get_string("repository")?,
            refname: attrs.get_string("refname")?,
            source_refname: attrs.get_string_or_empty("source_refname")?,
            merge_condition: attrs.get_string_or_empty("merge_condition")?,
            merge_strategy_id: attrs.get_string_or_empty("merge_strategy_id")?,
            approval_quota_enabled: attrs.get_bool_or("approval_quota_enabled", true)?,
            approval_quota: attrs.get_string_or_empty("approval_quota")?,
            approval_count: attrs.get_int_or_zero("approval_count")?,
            mandatory_approval_count: attrs.get_int_or_zero("mandatory_approval_count")?,
            group_quota: attrs.get_int_or_zero("group_quota")?,
            delete_source_branch: attrs.get_bool_or("delete_source_branch", false)?,
            watch_build_result: attrs.get_bool_or("watch_build_result", false)?,
            watch_task_completion: attrs.get_bool_or("watch_task_completion", false)?,
            required_signatures: attrs.get_int_or_zero("required_signatures")?,
            required_builds: attrs.get_int_or_zero("required_builds")?,
            ignore_contributing_reviewers_approval: attrs
                .get_bool_or("ignore_contributing_reviewers_approval", true)?,
            enable_needs_work_veto: attrs.get_bool_or("enable_needs_work_veto", false)?,
            automerge_users: attrs.get_string_list("automerge_users")?,
        })
    }

    fn write_attributes(&self, attrs: &mut Attributes) {
        attrs.set_string("project", self.project.as_str());
        attrs.set_string("repository", self.repository.as_str());
        attrs.set_string("refname", self.refname.as_str());
        attrs.set_string("source_refname", self.source_refname.as_str());
        attrs.set_string("merge_condition", self.merge_condition.as_str());
        attrs.set_string("merge_strategy_id", self.merge_strategy_id.as_str());
        attrs.set_bool("approval_quota_enabled", self.approval_quota_enabled);
        attrs.set_string("approval_quota", self.approval_quota.as_str());
        attrs.set_int("approval_count", self.approval_count);
        attrs.set_int("mandatory_approval_count", self.mandatory_approval_count);
        attrs.set_int("group_quota", self.group_quota);
        attrs.set_bool("delete_source_branch", self.delete_source_branch);
        attrs.set_bool("watch_build_result", self.watch_build_result);
        attrs.set_bool("watch_task_completion", self.watch_task_completion);
        attrs.set_int("required_signatures", self.required_signatures);
        attrs.set_int("required_builds", self.required_builds);
        attrs.set_bool(
            "ignore_contributing_reviewers_approval",
            self.ignore_contributing_reviewers_approval,
        );
        attrs.set_bool("enable_needs_work_veto", self.enable_needs_work_veto);
        attrs.set_string_list("automerge_users", self.automerge_users.iter().cloned());
    }
}

#[async_trait]
impl PolicyConfig for AutomergePolicy {
    type Payload = AutomergeSettings;

    const TYPE_NAME: &'static str = "bitbucketserver_workzone_automerge";
    const KIND: &'static str = "automerge";
    const ARITY: KeyArity = KeyArity::Branch;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages the Workzone automerge policy of a branch")
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
                    .description("Target branch or branch pattern, e.g. refs/heads/master")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(AttributeBuilder::string("source_refname").optional().build())
            .attribute(AttributeBuilder::string("merge_condition").optional().build())
            .attribute(
                AttributeBuilder::string("merge_strategy_id")
                    .default_value("none-inherit")
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("approval_quota_enabled")
                    .default_value(true)
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("approval_quota")
                    .description("Required approval percentage")
                    .optional()
                    .build(),
            )
            .attribute(AttributeBuilder::number("approval_count").optional().build())
            .attribute(
                AttributeBuilder::number("mandatory_approval_count")
                    .optional()
                    .build(),
            )
            .attribute(AttributeBuilder::number("group_quota").optional().build())
            .attribute(
                AttributeBuilder::bool("delete_source_branch")
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("watch_build_result")
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("watch_task_completion")
                    .default_value(false)
                    .build(),
            )
            .attribute(AttributeBuilder::number("required_signatures").optional().build())
            .attribute(AttributeBuilder::number("required_builds").optional().build())
            .attribute(
                AttributeBuilder::bool("ignore_contributing_reviewers_approval")
                    .default_value(true)
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("enable_needs_work_veto")
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_list("automerge_users")
                    .description("Usernames allowed to trigger automerge")
                    .optional()
                    .build(),
            )
            .build()
    }

    fn key(&self) -> Result<PolicyKey, ReconcileError> {
        PolicyKey::new(&self.project, &self.repository, Some(&self.refname))
    }

    async fn to_payload(&self, users: &dyn UserResolver) -> Result<AutomergeSettings, ApiError> {
        Ok(AutomergeSettings {
            project_key: self.project.clone(),
            repo_slug: self.repository.clone(),
            ref_name: self.refname.clone(),
            src_ref_name: self.source_refname.clone(),
            merge_condition: self.merge_condition.clone(),
            merge_strategy_id: self.merge_strategy_id.clone(),
            approval_quota: self.approval_quota.clone(),
            approval_count: self.approval_count,
            mandatory_approval_count: self.mandatory_approval_count,
            group_quota: self.group_quota,
            auto_merge_enabled: false,
            approval_quota_enabled: self.approval_quota_enabled,
            delete_source_branch: self.delete_source_branch,
            watch_build_result: self.watch_build_result,
            watch_task_completion: self.watch_task_completion,
            required_signatures_count: self.required_signatures,
            required_builds_count: self.required_builds,
            ignore_contributing_reviewers_approval: self.ignore_contributing_reviewers_approval,
            enable_needs_work_veto: self.enable_needs_work_veto,
            automerge_users: resolve_users(&self.automerge_users, users).await?,
        })
    }

    fn reconcile(&mut self, remote: AutomergeSettings) {
        self.source_refname = remote.src_ref_name;
        self.merge_condition = remote.merge_condition;
        self.merge_strategy_id = remote.merge_strategy_id;
        self.approval_quota_enabled = remote.approval_quota_enabled;
        self.approval_quota = remote.approval_quota;
        self.approval_count = remote.approval_count;
        self.mandatory_approval_count = remote.mandatory_approval_count;
        self.group_quota = remote.group_quota;
        self.delete_source_branch = remote.delete_source_branch;
        self.watch_build_result = remote.watch_build_result;
        self.watch_task_completion = remote.watch_task_completion;
        self.required_signatures = remote.required_signatures_count;
        self.required_builds = remote.required_builds_count;
        self.ignore_contributing_reviewers_approval = remote.ignore_contributing_reviewers_approval;
        self.enable_needs_work_veto = remote.enable_needs_work_veto;
        self.automerge_users = user_names(remote.automerge_users);
    }
}
