use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SAVE_DEBOUNCE_MS;
use crate::models::Message;
use crate::services::history::ConversationStore;
use crate::services::persister::Persister;

pub type SharedStore<P> = Arc<Mutex<ConversationStore<P>>>;

/// Coalesces message batches arriving in quick succession (a streaming
/// reply, say) into one `save` once the chat has been quiet for the store's
/// configured debounce interval.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    tx: mpsc::UnboundedSender<Vec<Message>>,
}

impl SaveDebouncer {
    /// Start the background task. Pending work is flushed when `cancel`
    /// fires or every `SaveDebouncer` handle has been dropped.
    pub fn spawn<P>(
        store: SharedStore<P>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>)
    where
        P: Persister + 'static,
    {
        let delay = store
            .lock()
            .map(|s| s.settings().debounce())
            .unwrap_or(Duration::from_millis(SAVE_DEBOUNCE_MS));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, delay, cancel, rx));
        (Self { tx }, handle)
    }

    /// Replace the pending batch and restart the timer. Returns `false` once
    /// the task has stopped.
    pub fn schedule(&self, messages: Vec<Message>) -> bool {
        self.tx.send(messages).is_ok()
    }
}

async fn run<P: Persister>(
    store: SharedStore<P>,
    delay: Duration,
    cancel: CancellationToken,
    mut rx: mpsc::UnboundedReceiver<Vec<Message>>,
) {
    let mut pending: Option<Vec<Message>> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                while let Ok(batch) = rx.try_recv() {
                    pending = Some(batch);
                }
                flush(&store, pending.take());
                return;
            }
            batch = rx.recv() => {
                match batch {
                    Some(batch) => pending = Some(batch),
                    None => {
                        flush(&store, pending.take());
                        return;
                    }
                }
            }
            _ = tokio::time::sleep(delay), if pending.is_some() => {
                flush(&store, pending.take());
            }
        }
    }
}

fn flush<P: Persister>(store: &SharedStore<P>, batch: Option<Vec<Message>>) {
    let Some(messages) = batch else {
        return;
    };
    match store.lock() {
        Ok(mut store) => {
            store.save(messages);
        }
        Err(_) => tracing::error!("History store lock poisoned, dropping message batch"),
    }
}
