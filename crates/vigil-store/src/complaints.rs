//! Typed CRUD helpers for [`Complaint`] records, layered over the raw
//! document primitives.

use serde_json::{Map, Value};

use vigil_shared::constants::COMPLAINTS_COLLECTION;
use vigil_shared::types::{ComplaintId, Status};

use crate::document::{Collection, Direction, DocumentStore};
use crate::error::Result;
use crate::models::{Complaint, Message};
use crate::subscribe::{DocEvent, Subscription};

/// Typed view over the `complaints` collection.
#[derive(Clone)]
pub struct Complaints {
    collection: Collection,
}

impl DocumentStore {
    /// Handle to the complaints collection.
    pub fn complaints(&self) -> Complaints {
        Complaints {
            collection: self.collection(COMPLAINTS_COLLECTION),
        }
    }
}

impl Complaints {
    /// Insert a fully populated complaint, keyed by its id.
    pub async fn create(&self, complaint: &Complaint) -> Result<()> {
        self.collection
            .write(complaint.id.as_str(), complaint.to_document()?)
            .await
    }

    /// Fetch a single complaint by id.
    pub async fn get(&self, id: &ComplaintId) -> Result<Option<Complaint>> {
        match self.collection.read(id.as_str()).await? {
            Some(document) => Ok(Some(Complaint::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Whether a record already exists under `id`.
    pub async fn exists(&self, id: &ComplaintId) -> Result<bool> {
        Ok(self.collection.read(id.as_str()).await?.is_some())
    }

    /// All complaints, newest first.
    pub async fn list(&self) -> Result<Vec<Complaint>> {
        let documents = self
            .collection
            .query_ordered("timestamp", Direction::Descending)
            .await?;
        documents.into_iter().map(Complaint::from_document).collect()
    }

    /// Overwrite the status field. Concurrent writers race and the last
    /// committed write wins; no version token guards this.
    pub async fn set_status(&self, id: &ComplaintId, status: Status) -> Result<()> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::String(status.to_string()));
        self.collection.update(id.as_str(), fields).await
    }

    /// Append one message to the log via additive merge. The caller never
    /// reads the current log, so concurrent senders both land.
    pub async fn push_message(&self, id: &ComplaintId, message: &Message) -> Result<()> {
        let value = serde_json::to_value(message)?;
        self.collection
            .append_to_field(id.as_str(), "messages", value)
            .await
    }

    /// Standing watch on one complaint.
    pub fn watch(&self, id: &ComplaintId) -> Subscription<DocEvent> {
        self.collection.subscribe_doc(id.as_str())
    }

    /// Standing watch on the whole collection, newest first.
    pub fn watch_all(&self) -> Subscription<Vec<Value>> {
        self.collection
            .subscribe_query("timestamp", Direction::Descending)
    }
}
