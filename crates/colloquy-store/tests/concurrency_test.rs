use colloquy_llm::{Message, Role};
use colloquy_store::{ConversationStore, InMemoryConversationStore, StoreConfig};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_on_distinct_conversations() {
    let store = Arc::new(InMemoryConversationStore::new(StoreConfig::new(20)));

    let mut handles = Vec::new();
    for conversation in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let id = format!("conversation-{conversation}");
            for turn in 0..25 {
                store
                    .append(
                        &id,
                        Message::user(format!("{id} q{turn}")),
                        Message::assistant(format!("{id} a{turn}")),
                    )
                    .await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.conversation_count().await, 16);
    for conversation in 0..16 {
        let id = format!("conversation-{conversation}");
        let history = store.read(&id).await;
        assert_eq!(history.len(), 20);
        // Turns 15..25 survive, oldest first
        assert_eq!(history[0], Message::user(format!("{id} q15")));
        assert_eq!(history[19], Message::assistant(format!("{id} a24")));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_on_one_conversation_stay_paired() {
    let store = Arc::new(InMemoryConversationStore::new(StoreConfig::new(1000)));

    let mut handles = Vec::new();
    for writer in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for turn in 0..20 {
                store
                    .append(
                        "shared",
                        Message::user(format!("w{writer}-t{turn}")),
                        Message::assistant(format!("w{writer}-t{turn}")),
                    )
                    .await;
            }
        }));
    }

    // Readers racing the writers must only ever see whole pairs
    let reader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for _ in 0..200 {
                let history = store.read("shared").await;
                assert_eq!(history.len() % 2, 0);
                tokio::task::yield_now().await;
            }
        })
    };

    for handle in handles {
        handle.await.unwrap();
    }
    reader.await.unwrap();

    let history = store.read("shared").await;
    assert_eq!(history.len(), 8 * 20 * 2);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[0].content, pair[1].content);
    }
}
