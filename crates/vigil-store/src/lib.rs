//! # vigil-store
//!
//! Document storage for the Vigil complaint tracker.
//!
//! The application is thin glue over a hosted document database. This crate
//! pins down the exact slice of that database's contract the application
//! depends on (full-replace writes, named-field merges, additive array
//! merges, ordered collection queries, and full-snapshot subscriptions)
//! and provides an in-process [`DocumentStore`] with the same observable
//! semantics, plus the typed [`Complaint`] record helpers layered on top.

pub mod complaints;
pub mod document;
pub mod models;
pub mod subscribe;

mod error;

pub use complaints::Complaints;
pub use document::{Collection, Direction, DocumentStore};
pub use error::{Result, StoreError};
pub use models::{Complaint, Message};
pub use subscribe::{CancelHandle, DocEvent, Subscription};
