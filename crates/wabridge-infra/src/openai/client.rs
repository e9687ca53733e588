//! OpenAiAssistantClient -- HTTP implementation of the assistant ports.
//!
//! Talks to the OpenAI Assistants API v2 (threads, messages, runs, files,
//! assistants) with bearer authentication. Every trait method is exactly one
//! HTTP request.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use std::path::Path;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use wabridge_core::assistant::api::{AssistantAdmin, AssistantApi};
use wabridge_types::assistant::{
    Assistant, AssistantDefinition, AssistantError, Run, RunId, SessionMessage, UploadedFile,
};
use wabridge_types::session::SessionId;

use super::types::{
    AssistantObject, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, ErrorEnvelope,
    FileObject, ListResponse, MessageObject, RunObject, ThreadObject,
};

/// Assistants API client.
///
/// Does not derive `Debug` so the key cannot leak through formatting.
pub struct OpenAiAssistantClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiAssistantClient {
    /// Beta header required by the v2 Assistants endpoints.
    const BETA_HEADER: (&'static str, &'static str) = ("OpenAI-Beta", "assistants=v2");

    /// Create a client with a per-request `timeout`.
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .header(Self::BETA_HEADER.0, Self::BETA_HEADER.1)
    }

    /// Send a request and decode a 2xx JSON body into `T`.
    ///
    /// `resource` names the target in `NotFound` errors.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: impl FnOnce() -> String,
    ) -> Result<T, AssistantError> {
        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, resource));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AssistantError::Deserialization(format!("failed to parse response: {e}")))
    }
}

/// Map a non-2xx response onto the error taxonomy.
fn map_status(status: StatusCode, body: &str, resource: impl FnOnce() -> String) -> AssistantError {
    match status.as_u16() {
        401 => AssistantError::AuthenticationFailed,
        404 => AssistantError::NotFound {
            resource: resource(),
        },
        429 => AssistantError::RateLimited,
        code => {
            let message = serde_json::from_str::<ErrorEnvelope>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.to_string());
            AssistantError::Remote {
                status: code,
                message,
            }
        }
    }
}

impl AssistantApi for OpenAiAssistantClient {
    async fn create_session(&self) -> Result<SessionId, AssistantError> {
        let request = self
            .request(Method::POST, "/threads")
            .json(&serde_json::json!({}));
        let thread: ThreadObject = self.send(request, || "threads endpoint".to_string()).await?;
        debug!(session_id = %thread.id, "Created thread");
        Ok(SessionId(thread.id))
    }

    async fn post_message(&self, session_id: &SessionId, text: &str) -> Result<(), AssistantError> {
        let request = self
            .request(Method::POST, &format!("/threads/{session_id}/messages"))
            .json(&CreateMessageRequest {
                role: "user",
                content: text,
            });
        let message: MessageObject = self
            .send(request, || format!("thread {session_id}"))
            .await?;
        debug!(session_id = %session_id, message_id = %message.id, "Posted message");
        Ok(())
    }

    async fn start_run(&self, session_id: &SessionId, assistant_id: &str) -> Result<Run, AssistantError> {
        let request = self
            .request(Method::POST, &format!("/threads/{session_id}/runs"))
            .json(&CreateRunRequest { assistant_id });
        let run: RunObject = self
            .send(request, || format!("thread {session_id} or assistant {assistant_id}"))
            .await?;
        run.try_into()
    }

    async fn retrieve_run(&self, session_id: &SessionId, run_id: &RunId) -> Result<Run, AssistantError> {
        let request = self.request(Method::GET, &format!("/threads/{session_id}/runs/{run_id}"));
        let run: RunObject = self.send(request, || format!("run {run_id}")).await?;
        run.try_into()
    }

    async fn list_messages(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<SessionMessage>, AssistantError> {
        let request = self
            .request(Method::GET, &format!("/threads/{session_id}/messages"))
            .query(&[("order", "desc".to_string()), ("limit", limit.to_string())]);
        let list: ListResponse<MessageObject> = self
            .send(request, || format!("thread {session_id}"))
            .await?;
        Ok(list.data.into_iter().map(SessionMessage::from).collect())
    }
}

impl AssistantAdmin for OpenAiAssistantClient {
    async fn upload_file(&self, path: &Path) -> Result<UploadedFile, AssistantError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AssistantError::Io(format!("failed to read {}: {e}", path.display())))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "knowledge".to_string());

        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(filename));
        let request = self.request(Method::POST, "/files").multipart(form);

        let file: FileObject = self.send(request, || "files endpoint".to_string()).await?;
        Ok(file.into())
    }

    async fn create_assistant(&self, definition: &AssistantDefinition) -> Result<Assistant, AssistantError> {
        let request = self
            .request(Method::POST, "/assistants")
            .json(&CreateAssistantRequest::from(definition));
        let assistant: AssistantObject = self
            .send(request, || "assistants endpoint".to_string())
            .await?;
        Ok(assistant.into())
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantError> {
        let request = self.request(Method::GET, &format!("/assistants/{assistant_id}"));
        let assistant: AssistantObject = self
            .send(request, || format!("assistant {assistant_id}"))
            .await?;
        Ok(assistant.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use wabridge_types::assistant::{MessageRole, RunStatus};

    fn client(server: &Server) -> OpenAiAssistantClient {
        OpenAiAssistantClient::new(
            SecretString::from("sk-test".to_string()),
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_session_sends_auth_and_beta_headers() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/threads")
            .match_header("authorization", "Bearer sk-test")
            .match_header("openai-beta", "assistants=v2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"thread_abc","object":"thread","created_at":1700000000}"#)
            .create_async()
            .await;

        let session = client(&server).create_session().await.unwrap();

        assert_eq!(session, SessionId::from("thread_abc"));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_sends_user_role() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/threads/thread_abc/messages")
            .match_body(Matcher::Json(serde_json::json!({"role": "user", "content": "Hello"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"msg_1","role":"user","created_at":1700000000,"content":[{"type":"text","text":{"value":"Hello","annotations":[]}}]}"#,
            )
            .create_async()
            .await;

        client(&server)
            .post_message(&SessionId::from("thread_abc"), "Hello")
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_message_to_missing_thread_is_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/threads/thread_gone/messages")
            .with_status(404)
            .with_body(r#"{"error":{"message":"No thread found with id 'thread_gone'.","type":"invalid_request_error"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .post_message(&SessionId::from("thread_gone"), "Hello")
            .await
            .unwrap_err();

        match err {
            AssistantError::NotFound { resource } => assert_eq!(resource, "thread thread_gone"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_run_parses_status() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/threads/thread_abc/runs")
            .match_body(Matcher::PartialJson(serde_json::json!({"assistant_id": "asst_1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"run_1","thread_id":"thread_abc","status":"queued","last_error":null}"#)
            .create_async()
            .await;

        let run = client(&server)
            .start_run(&SessionId::from("thread_abc"), "asst_1")
            .await
            .unwrap();

        assert_eq!(run.id, RunId("run_1".to_string()));
        assert_eq!(run.status, RunStatus::Queued);
        assert!(run.last_error.is_none());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_retrieve_failed_run_carries_last_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/threads/thread_abc/runs/run_1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"run_1","thread_id":"thread_abc","status":"failed","last_error":{"code":"server_error","message":"Sorry, something went wrong."}}"#,
            )
            .create_async()
            .await;

        let run = client(&server)
            .retrieve_run(&SessionId::from("thread_abc"), &RunId("run_1".to_string()))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.last_error.unwrap().code, "server_error");
    }

    #[tokio::test]
    async fn test_list_messages_newest_first() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/threads/thread_abc/messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("order".into(), "desc".into()),
                Matcher::UrlEncoded("limit".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"object":"list","data":[
                    {"id":"msg_2","role":"assistant","created_at":1700000001,"content":[{"type":"text","text":{"value":"Hi!","annotations":[]}}]},
                    {"id":"msg_1","role":"user","created_at":1700000000,"content":[{"type":"text","text":{"value":"Hello","annotations":[]}}]}
                ],"has_more":false}"#,
            )
            .create_async()
            .await;

        let messages = client(&server)
            .list_messages(&SessionId::from("thread_abc"), 10)
            .await
            .unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[0].text, "Hi!");
        assert_eq!(messages[1].role, MessageRole::User);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_failed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/threads")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = client(&server).create_session().await.unwrap_err();
        assert!(matches!(err, AssistantError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limited() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/threads")
            .with_status(429)
            .create_async()
            .await;

        let err = client(&server).create_session().await.unwrap_err();
        assert!(matches!(err, AssistantError::RateLimited));
    }

    #[tokio::test]
    async fn test_server_error_carries_remote_message() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/threads")
            .with_status(500)
            .with_body(r#"{"error":{"message":"The server had an error"}}"#)
            .create_async()
            .await;

        let err = client(&server).create_session().await.unwrap_err();
        match err {
            AssistantError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "The server had an error");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/threads")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server).create_session().await.unwrap_err();
        assert!(matches!(err, AssistantError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = OpenAiAssistantClient::new(
            SecretString::from("sk-test".to_string()),
            "http://127.0.0.1:1",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.create_session().await.unwrap_err();
        assert!(matches!(err, AssistantError::Transport(_)));
    }

    #[tokio::test]
    async fn test_upload_file_sends_multipart() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/files")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
            .match_body(Matcher::Regex("assistants".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"file-abc","object":"file","bytes":11,"filename":"faq.txt","purpose":"assistants"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.txt");
        std::fs::write(&path, "hello world").unwrap();

        let file = client(&server).upload_file(&path).await.unwrap();

        assert_eq!(file.id, "file-abc");
        assert_eq!(file.bytes, 11);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let server = Server::new_async().await;

        let err = client(&server)
            .upload_file(Path::new("/nonexistent/faq.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::Io(_)));
    }

    #[tokio::test]
    async fn test_create_assistant_attaches_files() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/assistants")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "WhatsApp AI Assistant",
                "tools": [{"type": "file_search"}],
                "tool_resources": {"file_search": {"vector_stores": [{"file_ids": ["file-abc"]}]}}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"asst_1","object":"assistant","name":"WhatsApp AI Assistant","model":"gpt-4-1106-preview","instructions":"Be helpful","tools":[{"type":"file_search"}]}"#,
            )
            .create_async()
            .await;

        let definition = AssistantDefinition {
            knowledge_file_ids: vec!["file-abc".to_string()],
            ..Default::default()
        };
        let assistant = client(&server).create_assistant(&definition).await.unwrap();

        assert_eq!(assistant.id, "asst_1");
        assert_eq!(assistant.tools, vec!["file_search"]);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_retrieve_unknown_assistant_is_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/assistants/asst_missing")
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server)
            .retrieve_assistant("asst_missing")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::NotFound { .. }));
    }
}
