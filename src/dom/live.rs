use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::dom::dom_model::{Document, MutationBatch};
use crate::dom::style;

// ============================================================================
// Live page — shared document plus mutation subscriptions
// ============================================================================
//
// The crate's stand-in for a browser page: one owned document behind a lock,
// with change notification delivered to subscribers in batches. Dropping a
// receiver is the disconnect.

#[derive(Clone)]
pub struct LivePage {
    doc: Arc<Mutex<Document>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<MutationBatch>>>>,
}

impl LivePage {
    pub fn new(doc: Document) -> Self {
        LivePage {
            doc: Arc::new(Mutex::new(doc)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn document(&self) -> Arc<Mutex<Document>> {
        Arc::clone(&self.doc)
    }

    /// Read access under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        f(&doc)
    }

    /// New mutation subscription; receives every batch emitted after this
    /// call.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<MutationBatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.push(tx);
        rx
    }

    /// Mutate the document and deliver the produced records as one batch.
    /// The lock is released before delivery.
    pub fn mutate(&self, f: impl FnOnce(&mut Document) -> MutationBatch) {
        let batch = {
            let mut doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut doc)
        };
        self.broadcast(batch);
    }

    /// Install a stylesheet's effects. Style injection is not a page
    /// mutation; subscribers are not notified.
    pub fn apply_css(&self, css: &str) -> usize {
        let mut doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        style::apply_css(&mut doc, css)
    }

    fn broadcast(&self, batch: MutationBatch) {
        if batch.is_empty() {
            return;
        }
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
    }
}
