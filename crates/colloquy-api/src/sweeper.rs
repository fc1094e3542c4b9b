use colloquy_store::ConversationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically drop conversations that have been idle past the store's TTL.
///
/// Runs until the returned handle is aborted or the runtime shuts down.
pub fn spawn_eviction_sweeper(
    store: Arc<dyn ConversationStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = store.evict_expired().await;
            if evicted > 0 {
                let remaining = store.conversation_count().await;
                tracing::info!(evicted, remaining, "Swept idle conversations");
            } else {
                tracing::trace!("No idle conversations to sweep");
            }
        }
    })
}
