//! Erasure Core - account self-service deletion
//!
//! The workflow behind a "delete my account" form:
//! - Validates the submitted credential locally
//! - Gates the destructive sequence behind explicit confirmation, optionally
//!   with a cancellable countdown
//! - Re-authenticates, deletes the user record (best effort) and deletes the
//!   identity, in that order
//! - Maps backend failures to a closed set of user-facing errors
//!
//! # Example
//!
//! ```rust
//! use erasure_core::{
//!     AccountDeletionWorkflow, Credential, IdentityService, RecordStore, WorkflowConfig,
//! };
//! use std::sync::Arc;
//!
//! async fn delete_account(
//!     identity: Arc<dyn IdentityService>,
//!     records: Arc<dyn RecordStore>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let workflow = AccountDeletionWorkflow::new(WorkflowConfig::new(), identity, records)?;
//!
//!     workflow.submit(Credential::new("a@b.com", "secret"))?;
//!     let state = workflow.confirm().await?;
//!
//!     println!("Finished in {state}");
//!     Ok(())
//! }
//! ```

pub mod countdown;
pub mod error;
pub mod services;
pub mod state_machine;
pub mod types;
pub mod workflow;

pub use countdown::{CountdownTask, TickFlow};
pub use error::{
    ErrorCategory, ErrorDetail, ErrorKind, IdentityError, RecordStoreError, TransitionError,
    WorkflowError,
};
pub use services::{IdentityService, RecordStore};
pub use state_machine::{EventKind, WorkflowEvent};
pub use types::{
    Banner, BannerTone, ConfirmationPolicy, Credential, Principal, PrincipalId, RecordKey,
    SessionToken, WorkflowConfig, WorkflowSnapshot, WorkflowState, DEFAULT_COUNTDOWN_SECS,
    DEFAULT_RECORD_COLLECTION,
};
pub use workflow::AccountDeletionWorkflow;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the workflow
    pub use crate::{
        AccountDeletionWorkflow, ConfirmationPolicy, Credential, ErrorDetail, ErrorKind,
        IdentityService, RecordStore, WorkflowConfig, WorkflowSnapshot, WorkflowState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
