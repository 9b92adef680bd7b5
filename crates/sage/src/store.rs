//! In-memory conversation histories keyed by thread id.
//!
//! Each thread has its own async mutex, so turns on one thread run one at a time while
//! different threads proceed in parallel. The map of threads sits behind a separate lock that
//! is only held long enough to find or create an entry.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::models::message::Message;

/// Exclusive handle on one thread's history, held for the length of a turn
pub type ThreadHistory = OwnedMutexGuard<Vec<Message>>;

#[derive(Default)]
pub struct ConversationStore {
    threads: RwLock<HashMap<String, Arc<Mutex<Vec<Message>>>>>,
}

impl ConversationStore {
    /// Create an empty store, once per process
    pub fn init() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Lock a thread's history for appending, creating the thread if it is new
    ///
    /// Waits for any turn already running on the same thread to finish.
    pub async fn lock(&self, thread_id: &str) -> ThreadHistory {
        let thread = self.thread(thread_id).await;
        thread.lock_owned().await
    }

    /// A copy of a thread's history, or `None` if the thread has never been used
    pub async fn snapshot(&self, thread_id: &str) -> Option<Vec<Message>> {
        let thread = self.threads.read().await.get(thread_id).cloned()?;
        let history = thread.lock().await;
        Some(history.clone())
    }

    pub async fn thread_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.threads.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn thread(&self, thread_id: &str) -> Arc<Mutex<Vec<Message>>> {
        if let Some(thread) = self.threads.read().await.get(thread_id) {
            return Arc::clone(thread);
        }
        let mut threads = self.threads.write().await;
        Arc::clone(threads.entry(thread_id.to_string()).or_default())
    }
}
