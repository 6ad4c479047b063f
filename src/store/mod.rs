//! Remote document store

pub mod firestore;

pub use firestore::{FieldValue, FirestoreClient, RawDocument};
