//! Erasure Firebase - REST backends for the deletion workflow
//!
//! Implements the `IdentityService` and `RecordStore` seams from
//! `erasure-core` against Firebase Authentication (Identity Toolkit v1)
//! and Cloud Firestore (v1). The auth and Firestore emulators are honoured
//! through the standard `*_EMULATOR_HOST` variables.

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod records;

pub use client::FirebaseClient;
pub use config::FirebaseConfig;
pub use error::ConfigError;
pub use identity::FirebaseIdentity;
pub use records::FirestoreRecords;
