//! Target resolution.
//!
//! The document builder never looks targets up itself; callers resolve a
//! [`TargetId`] through a [`TargetCatalog`] and hand the resulting
//! [`Target`] over inside the request.

use async_trait::async_trait;

use crate::error::RtmlResult;
use crate::models::{Target, TargetId};

pub mod local;

pub use local::LocalCatalog;

/// Source of target coordinates.
#[async_trait]
pub trait TargetCatalog: Send + Sync {
    /// Look up a target by id.
    ///
    /// Fails with [`crate::RtmlError::TargetNotFound`] for unknown ids.
    async fn resolve_target(&self, id: TargetId) -> RtmlResult<Target>;
}
