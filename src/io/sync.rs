use std::thread;
use std::time::Duration;

use serde_json::json;

use crate::model::category::Category;
use crate::model::task::Task;

/// Error type for remote mirror calls
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("bad response: {0}")]
    Response(String),
}

/// Client for an optional remote task mirror.
///
/// Pulls are blocking and report errors. Pushes are fire-and-forget: each
/// one runs on its own thread, and a failure only warns, so local edits
/// never wait on or fail because of the network.
#[derive(Debug, Clone)]
pub struct SyncClient {
    base_url: String,
    http: ureq::Agent,
}

impl SyncClient {
    pub fn new(base_url: &str) -> Self {
        SyncClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(5))
                .build(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
        self.get_json("/api/tasks")
    }

    pub fn fetch_categories(&self) -> Result<Vec<Category>, SyncError> {
        self.get_json("/api/categories")
    }

    pub fn push_task(&self, task: &Task) {
        let body = json!({ "task": task });
        self.fire_and_forget("/api/tasks", Push::Post(body));
    }

    pub fn remove_task(&self, id: &str) {
        self.fire_and_forget(&format!("/api/tasks/{}", id), Push::Delete);
    }

    pub fn push_category(&self, category: &Category) {
        let body = json!({ "category": category });
        self.fire_and_forget("/api/categories", Push::Post(body));
    }

    pub fn remove_category(&self, id: &str) {
        self.fire_and_forget(&format!("/api/categories/{}", id), Push::Delete);
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let resp = self
            .http
            .get(&self.url(path))
            .call()
            .map_err(|e| SyncError::Request(e.to_string()))?;
        resp.into_json()
            .map_err(|e| SyncError::Response(format!("failed to parse JSON: {}", e)))
    }

    fn fire_and_forget(&self, path: &str, push: Push) {
        let http = self.http.clone();
        let url = self.url(path);
        let spawned = thread::Builder::new()
            .name("sprig-sync".to_string())
            .spawn(move || {
                let result = match push {
                    Push::Post(body) => http.post(&url).send_json(body).map(|_| ()),
                    Push::Delete => http.delete(&url).call().map(|_| ()),
                };
                if let Err(e) = result {
                    eprintln!("warning: sync to {} failed: {}", url, e);
                }
            });
        if let Err(e) = spawned {
            eprintln!("warning: could not spawn sync thread: {}", e);
        }
    }
}

enum Push {
    Post(serde_json::Value),
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = SyncClient::new("http://localhost:4000/");
        assert_eq!(client.url("/api/tasks"), "http://localhost:4000/api/tasks");
    }

    #[test]
    fn fetch_tasks_parses_response_body() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).unwrap();
            let body = r#"[{"id":"7","title":"remote task"}]"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        let client = SyncClient::new(&format!("http://{}", addr));
        let tasks = client.fetch_tasks().unwrap();
        server.join().unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "7");
        assert_eq!(tasks[0].title, "remote task");
    }

    #[test]
    fn fetch_from_unreachable_server_is_request_error() {
        // Reserved port nobody is listening on
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SyncClient::new(&format!("http://{}", addr));
        assert!(matches!(client.fetch_tasks(), Err(SyncError::Request(_))));
    }

    #[test]
    fn push_to_unreachable_server_does_not_panic() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SyncClient::new(&format!("http://{}", addr));
        client.push_task(&Task::new("lost update"));
        client.remove_task("42");
        // Give the background threads time to fail quietly
        std::thread::sleep(Duration::from_millis(200));
    }
}
