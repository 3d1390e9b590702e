use super::{MessageTransport, ServerHealth};
use crate::models::message::{Message, Sender};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use url::Url;

/// REST client for the chat API.
#[derive(Debug)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateMessageRequest {
    content: String,
    conversation_id: i64,
}

/// Wire form of a confirmed message. The API uses snake_case everywhere
/// except `fileUrl`, which is preserved via the rename.
#[derive(Serialize, Deserialize)]
struct WireMessage {
    id: i64,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
    conversation_id: i64,
    #[serde(rename = "fileUrl", default, skip_serializing_if = "Option::is_none")]
    file_url: Option<String>,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message::confirmed(
            wire.id,
            wire.content,
            wire.sender,
            wire.timestamp,
            wire.conversation_id,
            wire.file_url,
        )
    }
}

#[derive(Deserialize)]
struct HealthcheckResponse {
    status: String,
    system_info: SystemInfo,
}

#[derive(Deserialize)]
struct SystemInfo {
    version: String,
    environment: String,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Url::parse(base_url).map_err(|e| format!("Invalid server URL '{}': {}", base_url, e))?;
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn get(&self, route: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(format!("{}{}", self.base_url, route)))
    }

    fn post(&self, route: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(format!("{}{}", self.base_url, route)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl MessageTransport for HttpTransport {
    async fn create_message(
        &self,
        content: &str,
        conversation_id: i64,
    ) -> Result<Message, Box<dyn Error + Send + Sync>> {
        let req = CreateMessageRequest {
            content: content.to_string(),
            conversation_id,
        };
        let resp = self
            .post("/v1/messages")
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let wire = resp.json::<WireMessage>().await?;
        Ok(wire.into())
    }

    async fn list_messages(&self) -> Result<Vec<Message>, Box<dyn Error + Send + Sync>> {
        let resp = self.get("/v1/messages").send().await?.error_for_status()?;
        let wire = resp.json::<Vec<WireMessage>>().await?;
        Ok(wire.into_iter().map(Message::from).collect())
    }

    async fn healthcheck(&self) -> Result<ServerHealth, Box<dyn Error + Send + Sync>> {
        let resp = self
            .get("/v1/healthcheck")
            .send()
            .await?
            .error_for_status()?;
        let health = resp.json::<HealthcheckResponse>().await?;
        Ok(ServerHealth {
            status: health.status,
            version: health.system_info.version,
            environment: health.system_info.environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageId;
    use serde_json::json;

    #[test]
    fn create_request_carries_only_content_and_conversation_id() {
        let req = CreateMessageRequest {
            content: "hi".into(),
            conversation_id: 1,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({ "content": "hi", "conversation_id": 1 }));
    }

    #[test]
    fn wire_message_deserializes_with_file_url_rename() {
        let wire: WireMessage = serde_json::from_value(json!({
            "id": 5,
            "content": "hello",
            "sender": "assistant",
            "timestamp": "2024-03-01T12:00:00Z",
            "conversation_id": 2,
            "fileUrl": "https://files.example/att.png"
        }))
        .unwrap();
        let msg: Message = wire.into();
        assert_eq!(msg.id, MessageId::Permanent(5));
        assert_eq!(msg.sender, Sender::Assistant);
        assert_eq!(msg.conversation_id, 2);
        assert_eq!(msg.file_url.as_deref(), Some("https://files.example/att.png"));
    }

    #[test]
    fn wire_message_tolerates_missing_file_url() {
        let wire: WireMessage = serde_json::from_value(json!({
            "id": 6,
            "content": "hi",
            "sender": "user",
            "timestamp": "2024-03-01T12:00:00Z",
            "conversation_id": 1
        }))
        .unwrap();
        assert!(wire.file_url.is_none());
    }

    #[test]
    fn healthcheck_response_flattens_system_info() {
        let health: HealthcheckResponse = serde_json::from_value(json!({
            "status": "healthy",
            "system_info": { "version": "0.0.1", "environment": "production" }
        }))
        .unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.system_info.version, "0.0.1");
        assert_eq!(health.system_info.environment, "production");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(HttpTransport::new("not a url", None, 30).is_err());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let transport = HttpTransport::new("http://localhost:8000/", None, 30).unwrap();
        assert_eq!(transport.base_url, "http://localhost:8000");
    }
}
