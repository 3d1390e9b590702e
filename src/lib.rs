pub mod cli;
pub mod coordinator;
pub mod models;
pub mod store;
pub mod transport;

use cli::Args;
use coordinator::{CoordinatorError, SendCoordinator, SendOutcome};
use log::{error, info, warn};
use std::error::Error;
use store::{format_transcript, ConversationStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use transport::create_transport;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server URL: {}", args.server_url);
    info!("Conversation Id: {}", args.conversation_id);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Auth Enabled: {}", args.server_api_key.is_some());
    info!("-------------------------");

    let transport = create_transport(&args)?;

    if !args.skip_healthcheck {
        let health = transport.healthcheck().await?;
        info!(
            "Server is {} (version {}, environment {})",
            health.status, health.version, health.environment
        );
    }

    let store = ConversationStore::new();
    let coordinator = SendCoordinator::new(transport, store.clone());

    match coordinator.refresh().await {
        Ok(count) => info!("Fetched {} existing messages", count),
        Err(e) => warn!("Initial fetch failed: {}", e),
    }

    if let Some(message) = &args.message {
        return send_one(&coordinator, message, args.conversation_id).await;
    }

    print_conversation(&store, args.conversation_id);
    println!("Type a message and press Enter. Type 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "exit" || line.trim() == "quit" {
            break;
        }

        match coordinator.send(&line, args.conversation_id).await {
            Ok(SendOutcome::Skipped) => continue,
            Ok(SendOutcome::Confirmed(_)) => {
                // pick up the assistant's reply alongside our own message
                if let Err(e) = coordinator.refresh().await {
                    warn!("Refresh after send failed: {}", e);
                }
                print_conversation(&store, args.conversation_id);
            }
            Err(CoordinatorError::SendFailed(e)) => {
                error!("Message was not delivered: {}", e);
            }
            Err(e) => {
                error!("{}", e);
            }
        }
    }

    Ok(())
}

async fn send_one(
    coordinator: &SendCoordinator,
    message: &str,
    conversation_id: i64,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match coordinator.send(message, conversation_id).await? {
        SendOutcome::Skipped => {
            warn!("Nothing to send: message was empty");
            Ok(())
        }
        SendOutcome::Confirmed(confirmed) => {
            info!("Message delivered with id {:?}", confirmed.id);
            if let Err(e) = coordinator.refresh().await {
                warn!("Refresh after send failed: {}", e);
            }
            print_conversation(coordinator.store(), conversation_id);
            Ok(())
        }
    }
}

fn print_conversation(store: &ConversationStore, conversation_id: i64) {
    let messages = store.messages(conversation_id);
    if messages.is_empty() {
        return;
    }
    print!("{}", format_transcript(&messages));
}
