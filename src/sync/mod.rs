//! Snapshot synchronization
//!
//! The backend stores one opaque JSON blob per account and returns it
//! verbatim. It never interprets the payload.

pub mod handlers;
pub mod repository;

pub use repository::SnapshotRepository;
