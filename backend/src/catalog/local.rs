//! In-memory catalog, optionally seeded from a JSON file.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::TargetCatalog;
use crate::error::{RtmlError, RtmlResult};
use crate::models::{Target, TargetId};

/// One row of a catalog file.
#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    id: TargetId,
    name: String,
    ra: f64,
    dec: f64,
    #[serde(default = "default_epoch")]
    epoch: String,
}

fn default_epoch() -> String {
    "J2000".to_string()
}

#[derive(Debug, Clone, Default)]
pub struct LocalCatalog {
    targets: HashMap<TargetId, Target>,
}

impl LocalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of `{id, name, ra, dec, epoch?}` objects.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RtmlResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> RtmlResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(content).map_err(|e| {
            RtmlError::InvalidRequest(format!("Failed to parse target catalog: {}", e))
        })?;

        let mut catalog = Self::new();
        for entry in entries {
            let target = Target::new(entry.name, entry.ra, entry.dec, entry.epoch);
            catalog.insert(entry.id, target);
        }
        Ok(catalog)
    }

    /// Add or replace a target.
    pub fn insert(&mut self, id: TargetId, target: Target) -> Option<Target> {
        self.targets.insert(id, target)
    }

    pub fn with_target(mut self, id: TargetId, target: Target) -> Self {
        self.insert(id, target);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl TargetCatalog for LocalCatalog {
    async fn resolve_target(&self, id: TargetId) -> RtmlResult<Target> {
        self.targets
            .get(&id)
            .cloned()
            .ok_or_else(|| RtmlError::TargetNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_known_target() {
        let catalog = LocalCatalog::new()
            .with_target(TargetId(7), Target::new("M31", 10.6847, 41.2687, "J2000"));
        let target = catalog.resolve_target(TargetId(7)).await.unwrap();
        assert_eq!(target.name, "M31");
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let catalog = LocalCatalog::new();
        match catalog.resolve_target(TargetId(99)).await {
            Err(RtmlError::TargetNotFound(id)) => assert_eq!(id, "99"),
            other => panic!("expected TargetNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_from_json_defaults_epoch() {
        let catalog = LocalCatalog::from_json_str(
            r#"[
                {"id": 1, "name": "Vega", "ra": 279.2347, "dec": 38.7837},
                {"id": 2, "name": "SN 2023ixf", "ra": 210.9106, "dec": 54.3117, "epoch": "J2000.0"}
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve_target(TargetId(1)).await.unwrap().epoch, "J2000");
        assert_eq!(
            catalog.resolve_target(TargetId(2)).await.unwrap().epoch,
            "J2000.0"
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            LocalCatalog::from_json_str("{\"id\": 1}"),
            Err(RtmlError::InvalidRequest(_))
        ));
    }
}
