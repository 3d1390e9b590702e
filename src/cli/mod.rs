use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Base URL of the chat API server (e.g., http://127.0.0.1:8000)
    #[arg(long, env = "SERVER_URL", default_value = "http://127.0.0.1:8000")]
    pub server_url: String,

    /// Optional Bearer token for the chat API. If set, it is sent on every request.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    /// Request timeout in seconds for every chat API call.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Conversation Args ---
    /// Conversation id that sent messages belong to.
    #[arg(long, env = "CONVERSATION_ID", default_value = "1")]
    pub conversation_id: i64,

    /// Send this single message and exit instead of starting the interactive loop.
    #[arg(long, env = "MESSAGE")]
    pub message: Option<String>,

    /// Skip the startup healthcheck against the server.
    #[arg(long, env = "SKIP_HEALTHCHECK", default_value = "false")]
    pub skip_healthcheck: bool,
}
