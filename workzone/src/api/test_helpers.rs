//! Test helpers for the Bitbucket and Workzone APIs

use async_trait::async_trait;
use reqwest::Method;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::error::ApiError;
use super::transport::{ApiResponse, Transport};

const USERS_PREFIX: &str = "/rest/api/1.0/users/";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

/// In-memory Workzone server
///
/// Stores the last POSTed body per path and serves it back as a one element
/// array, like the real plugin. Users registered with `with_user` resolve,
/// every other lookup is a 404.
#[derive(Default)]
pub struct FakeWorkzone {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    policies: HashMap<String, String>,
    users: HashSet<String>,
    failing_posts: usize,
    post_delay: Option<Duration>,
    bare_objects: bool,
    get_response: Option<ApiResponse>,
    requests: Vec<RecordedRequest>,
}

impl FakeWorkzone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, name: &str) -> Self {
        self.lock().users.insert(name.to_string());
        self
    }

    /// The next `count` POSTs answer 404, as a freshly created repository does
    pub fn with_failing_posts(self, count: usize) -> Self {
        self.lock().failing_posts = count;
        self
    }

    /// Every POST waits this long before answering
    pub fn with_post_delay(self, delay: Duration) -> Self {
        self.lock().post_delay = Some(delay);
        self
    }

    /// Serve stored policies as a bare object instead of an array
    pub fn with_bare_objects(self) -> Self {
        self.lock().bare_objects = true;
        self
    }

    /// Answer every policy GET with this response
    pub fn with_get_response(self, status: u16, body: &str) -> Self {
        self.lock().get_response = Some(ApiResponse::new(status, body));
        self
    }

    pub fn with_policy(self, path: &str, body: serde_json::Value) -> Self {
        self.lock()
            .policies
            .insert(path.to_string(), body.to_string());
        self
    }

    pub fn stored(&self, path: &str) -> Option<serde_json::Value> {
        self.lock()
            .policies
            .get(path)
            .and_then(|body| serde_json::from_str(body).ok())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Transport for FakeWorkzone {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, ApiError> {
        let delay = self.lock().post_delay.filter(|_| method == Method::POST);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        let body = body.map(|b| String::from_utf8_lossy(&b).into_owned());
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.to_string(),
            body: body.clone(),
        });

        if let Some(name) = path.strip_prefix(USERS_PREFIX) {
            let name = urlencoding::decode(name)
                .map(|n| n.into_owned())
                .unwrap_or_default();
            if state.users.contains(&name) {
                let user = serde_json::json!({
                    "name": name,
                    "emailAddress": format!("{}@example.com", name),
                    "id": 1,
                    "displayName": name,
                    "active": true,
                    "slug": name,
                    "type": "NORMAL"
                });
                return Ok(ApiResponse::new(200, user.to_string()));
            }
            return Ok(ApiResponse::new(404, "user does not exist"));
        }

        let response = match method {
            Method::POST if state.failing_posts > 0 => {
                state.failing_posts -= 1;
                ApiResponse::new(404, "repository not ready")
            }
            Method::POST => {
                state
                    .policies
                    .insert(path.to_string(), body.unwrap_or_default());
                ApiResponse::new(200, "")
            }
            Method::GET => {
                if let Some(response) = &state.get_response {
                    return Ok(response.clone());
                }
                match state.policies.get(path) {
                    Some(stored) if state.bare_objects => ApiResponse::new(200, stored.clone()),
                    Some(stored) => ApiResponse::new(200, format!("[{}]", stored)),
                    None => ApiResponse::new(404, ""),
                }
            }
            Method::DELETE => match state.policies.remove(path) {
                Some(_) => ApiResponse::new(204, ""),
                None => ApiResponse::new(404, ""),
            },
            _ => ApiResponse::new(405, ""),
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_serves_stored_policies_as_arrays() {
        let fake = FakeWorkzone::new();
        fake.post("/p", br#"{"a":1}"#.to_vec()).await.unwrap();

        let response = fake.get("/p").await.unwrap();
        assert_eq!(response.body, r#"[{"a":1}]"#);

        assert_eq!(fake.delete("/p").await.unwrap().status, 204);
        assert_eq!(fake.get("/p").await.unwrap().status, 404);
        assert_eq!(fake.count(Method::GET), 2);
    }

    #[tokio::test]
    async fn fake_fails_the_requested_number_of_posts() {
        let fake = FakeWorkzone::new().with_failing_posts(2);

        assert_eq!(fake.post("/p", vec![]).await.unwrap().status, 404);
        assert_eq!(fake.post("/p", vec![]).await.unwrap().status, 404);
        assert_eq!(fake.post("/p", vec![]).await.unwrap().status, 200);
    }
}
