//! Provider and resource lifecycle against a mock Bitbucket Server

use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest,
    Resource, ResourceWithConfigure,
};
use tfplug::{Attributes, ResourceData};
use workzone::reconcile::RetryConfig;
use workzone::WorkzoneProvider;

const AUTH: &str = "Basic YWRtaW46YWRtaW4=";
const AUTOMERGE_PATH: &str = "/rest/workzoneresource/1.0/branch/automerge/TEST1/repo";
const WORKFLOW_PATH: &str = "/rest/workzoneresource/1.0/workflow/TEST1/repo";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn configured_resource(
    server_url: &str,
    retry: RetryConfig,
    type_name: &str,
) -> Box<dyn ResourceWithConfigure> {
    let mut provider = WorkzoneProvider::with_retry(retry);
    let config = Attributes::from_json(json!({
        "server": server_url,
        "username": "admin",
        "password": "admin"
    }))
    .unwrap();

    let configured = provider
        .configure(Context::new(), ConfigureProviderRequest { config })
        .await;
    assert!(configured.diagnostics.is_empty());

    let factories = provider.resources();
    let mut resource = factories.get(type_name).unwrap()();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: configured.provider_data,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

#[tokio::test(flavor = "multi_thread")]
async fn automerge_lifecycle_with_mock_server() {
    init_tracing();
    let mut server = Server::new_async().await;

    let user_mock = server
        .mock("GET", "/rest/api/1.0/users/admin")
        .match_header("authorization", AUTH)
        .with_status(200)
        .with_body(
            json!({
                "name": "admin",
                "emailAddress": "admin@example.com",
                "id": 1,
                "displayName": "Administrator",
                "active": true,
                "slug": "admin",
                "type": "NORMAL"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let post_mock = server
        .mock("POST", AUTOMERGE_PATH)
        .match_header("authorization", AUTH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "projectKey": "TEST1",
            "repoSlug": "repo",
            "refName": "refs/heads/master",
            "mergeStrategyId": "none-inherit",
            "approvalQuotaEnabled": true,
            "approvalQuota": "50",
            "automergeUsers": [{"name": "admin", "id": 1, "slug": "admin"}]
        })))
        .with_status(200)
        .create_async()
        .await;

    let get_mock = server
        .mock("GET", AUTOMERGE_PATH)
        .match_header("authorization", AUTH)
        .with_status(200)
        .with_body(
            json!([{
                "projectKey": "TEST1",
                "repoSlug": "repo",
                "refName": "refs/heads/master",
                "mergeStrategyId": "none-inherit",
                "approvalQuotaEnabled": true,
                "approvalQuota": 50,
                "ignoreContributingReviewersApproval": true,
                "automergeUsers": [{"name": "admin", "id": 1}]
            }])
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let delete_mock = server
        .mock("DELETE", AUTOMERGE_PATH)
        .match_header("authorization", AUTH)
        .match_body(Matcher::PartialJson(json!({"projectKey": "TEST1"})))
        .with_status(204)
        .create_async()
        .await;

    let resource = configured_resource(
        &server.url(),
        RetryConfig::default(),
        "bitbucketserver_workzone_automerge",
    )
    .await;

    let planned = ResourceData::new(
        Attributes::from_json(json!({
            "project": "TEST1",
            "repository": "repo",
            "refname": "refs/heads/master",
            "approval_quota": "50",
            "automerge_users": ["admin"]
        }))
        .unwrap(),
    );

    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "bitbucketserver_workzone_automerge".to_string(),
                planned_state: planned,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(created.new_state.id(), "TEST1|repo|refs/heads/master");
    assert_eq!(
        created.new_state.values.get_string("approval_quota").unwrap(),
        "50"
    );
    assert_eq!(
        created.new_state.values.get_string_list("automerge_users").unwrap(),
        vec!["admin"]
    );

    // Import-style read that starts from the identifier alone
    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "bitbucketserver_workzone_automerge".to_string(),
                current_state: ResourceData::with_id(
                    "TEST1|repo|refs/heads/master",
                    Attributes::new(),
                ),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    let state = read.new_state.unwrap();
    assert_eq!(state.values.get_string("project").unwrap(), "TEST1");
    assert_eq!(state.values.get_string("refname").unwrap(), "refs/heads/master");
    assert!(state.values.get_bool("ignore_contributing_reviewers_approval").unwrap());

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "bitbucketserver_workzone_automerge".to_string(),
                prior_state: state,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty());

    user_mock.assert_async().await;
    post_mock.assert_async().await;
    get_mock.assert_async().await;
    delete_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn create_gives_up_when_repository_never_becomes_ready() {
    init_tracing();
    let mut server = Server::new_async().await;

    let post_mock = server
        .mock("POST", WORKFLOW_PATH)
        .with_status(404)
        .with_body("Repository TEST1/repo does not exist")
        .expect_at_least(2)
        .create_async()
        .await;

    let resource = configured_resource(
        &server.url(),
        RetryConfig {
            timeout: Duration::from_millis(300),
            interval: Duration::from_millis(20),
        },
        "bitbucketserver_workzone_workflow",
    )
    .await;

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "bitbucketserver_workzone_workflow".to_string(),
                planned_state: ResourceData::new(
                    Attributes::from_json(json!({"project": "TEST1", "repository": "repo"}))
                        .unwrap(),
                ),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].summary,
        "Failed to create Workzone workflow policy"
    );
    assert!(response.diagnostics[0].detail.contains(WORKFLOW_PATH));
    assert!(response.diagnostics[0].detail.contains("does not exist"));
    assert!(!response.new_state.has_id());

    post_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn removed_policy_is_dropped_and_delete_tolerates_404() {
    init_tracing();
    let mut server = Server::new_async().await;

    let get_mock = server
        .mock("GET", WORKFLOW_PATH)
        .with_status(404)
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", WORKFLOW_PATH)
        .match_body(Matcher::Exact(String::new()))
        .with_status(404)
        .create_async()
        .await;

    let resource = configured_resource(
        &server.url(),
        RetryConfig::default(),
        "bitbucketserver_workzone_workflow",
    )
    .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "bitbucketserver_workzone_workflow".to_string(),
                current_state: ResourceData::with_id("TEST1|repo", Attributes::new()),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert!(read.new_state.is_none());

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "bitbucketserver_workzone_workflow".to_string(),
                prior_state: ResourceData::with_id("TEST1|repo", Attributes::new()),
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty());

    get_mock.assert_async().await;
    delete_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_read_is_reported() {
    init_tracing();
    let mut server = Server::new_async().await;

    let _get_mock = server
        .mock("GET", "/rest/workzoneresource/1.0/branch/reviewers/TEST1/repo")
        .with_status(401)
        .create_async()
        .await;

    let resource = configured_resource(
        &server.url(),
        RetryConfig::default(),
        "bitbucketserver_workzone_reviewers",
    )
    .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "bitbucketserver_workzone_reviewers".to_string(),
                current_state: ResourceData::with_id(
                    "TEST1|repo|refs/heads/master",
                    Attributes::new(),
                ),
            },
        )
        .await;

    assert_eq!(read.diagnostics.len(), 1);
    assert_eq!(read.diagnostics[0].detail, "Authentication failed");
    assert!(read.new_state.unwrap().has_id());
}
