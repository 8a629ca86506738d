//! External collaborators
//!
//! The workflow never constructs these itself; callers inject them so that
//! production backends and test doubles are interchangeable.

use crate::error::{IdentityError, RecordStoreError};
use crate::types::{Credential, Principal, RecordKey};

/// Verifies credentials and removes principals
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Verify `credential` and return the signed-in principal
    async fn authenticate(&self, credential: &Credential) -> Result<Principal, IdentityError>;

    /// Permanently remove `principal`
    async fn delete_identity(&self, principal: &Principal) -> Result<(), IdentityError>;
}

/// Keyed document storage
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Delete the document at `key`, authorized as `principal`
    async fn delete_record(
        &self,
        key: &RecordKey,
        principal: &Principal,
    ) -> Result<(), RecordStoreError>;
}

