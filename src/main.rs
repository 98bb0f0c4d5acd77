use std::sync::Arc;

use conversation::config::AppConfig;
use conversation::message::{LOCAL_AUTHOR, Message};
use conversation::names::{HttpNameProvider, WithFallbackNames};
use conversation::{ConversationState, Snapshot};
use tokio::runtime::Handle;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let provider = HttpNameProvider::new(&config.names).expect("names client init failed");
    info!(base_url = %config.names.base_url, "names service configured");

    let seed = vec![
        Message::new("Luis", "Are we still on for the design review?", "8:07 PM"),
        Message::new(LOCAL_AUTHOR, "Posting the mocks in a minute", "8:06 PM"),
    ];
    let state = ConversationState::new(config.channel, seed, Arc::new(WithFallbackNames::new(provider)), Handle::current())
        .with_delays(config.delays);
    info!(channel = state.channel_name(), members = state.channel_members(), "conversation opened");

    let mut changes = state.subscribe();
    let watcher = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let Snapshot { is_user_typing, other_user_typing, message_count } = changes.borrow_and_update().clone();
            info!(is_user_typing, other_user_typing = ?other_user_typing, message_count, "state changed");
        }
    });

    // A short burst of local keystrokes, then a send.
    for _ in 0..3 {
        state.start_typing();
        tokio::time::sleep(config.delays.local / 4).await;
    }
    state.stop_typing();
    state.add_message(Message::new(LOCAL_AUTHOR, "Mocks are up!", "8:08 PM"));

    // A remote participant joins and replies.
    state.simulate_other_user_typing();
    tokio::time::sleep(config.delays.remote * 2).await;

    if let Some(newest) = state.newest_message() {
        info!(author = %newest.author, content = %newest.content, "newest message");
    }

    state.shutdown();
    if let Err(e) = watcher.await {
        warn!(error = %e, "state watcher ended abnormally");
    }
}
