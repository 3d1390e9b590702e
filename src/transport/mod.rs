mod http;

use crate::cli::Args;
use crate::models::message::Message;
use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;

pub use http::HttpTransport;

/// Server status as reported by the healthcheck endpoint.
#[derive(Clone, Debug)]
pub struct ServerHealth {
    pub status: String,
    pub version: String,
    pub environment: String,
}

/// The chat API consumed as opaque async operations. Addressing, headers,
/// auth, and timeouts live behind this seam and nowhere else.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn create_message(
        &self,
        content: &str,
        conversation_id: i64,
    ) -> Result<Message, Box<dyn Error + Send + Sync>>;

    async fn list_messages(&self) -> Result<Vec<Message>, Box<dyn Error + Send + Sync>>;

    async fn healthcheck(&self) -> Result<ServerHealth, Box<dyn Error + Send + Sync>>;
}

pub fn create_transport(
    args: &Args,
) -> Result<Arc<dyn MessageTransport>, Box<dyn Error + Send + Sync>> {
    info!("Chat API endpoint: {}", args.server_url);
    let transport = HttpTransport::new(
        &args.server_url,
        args.server_api_key.clone(),
        args.request_timeout_secs,
    )?;
    Ok(Arc::new(transport))
}
