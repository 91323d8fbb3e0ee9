use crate::error::StoreError;
use crate::journal_entry::MoodRecord;
use crate::journal_state::JournalState;
use crate::store::RecordStore;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Outcome of a store call, delivered back to the event loop.
#[derive(Debug)]
pub enum StoreReply {
    Loaded(Result<Vec<MoodRecord>, StoreError>),
    Saved(Result<(), StoreError>),
}

/// Runs store calls on their own tasks so input keeps flowing while
/// they are pending. Calls are never cancelled or retried.
pub struct StoreTasks {
    store: Arc<dyn RecordStore>,
    replies_tx: UnboundedSender<StoreReply>,
    replies_rx: UnboundedReceiver<StoreReply>,
}

impl StoreTasks {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let (replies_tx, replies_rx) = unbounded_channel();
        StoreTasks {
            store,
            replies_tx,
            replies_rx,
        }
    }

    pub fn load(&self, state: &mut JournalState) {
        state.begin_load();

        let store = Arc::clone(&self.store);
        let replies = self.replies_tx.clone();
        tokio::spawn(async move {
            let result = store.select_entries().await;
            let _ = replies.send(StoreReply::Loaded(result));
        });
    }

    /// Starts an insert when the note passes validation.
    pub fn save(&self, state: &mut JournalState) {
        let Ok(entry) = state.begin_save() else {
            return;
        };

        debug!(sentiment = %entry.sentiment, "insert dispatched");
        let store = Arc::clone(&self.store);
        let replies = self.replies_tx.clone();
        tokio::spawn(async move {
            let result = store.insert_entry(&entry).await;
            let _ = replies.send(StoreReply::Saved(result));
        });
    }

    /// Next finished store call. Never yields `None` while `self` is alive.
    pub async fn next_reply(&mut self) -> Option<StoreReply> {
        self.replies_rx.recv().await
    }

    /// Hands a reply to `state`; a successful insert triggers a reload.
    pub fn apply(&self, state: &mut JournalState, reply: StoreReply) {
        match reply {
            StoreReply::Loaded(result) => {
                let _ = state.finish_load(result);
            }
            StoreReply::Saved(result) => {
                if state.finish_save(result).is_ok() {
                    self.load(state);
                }
            }
        }
    }
}
