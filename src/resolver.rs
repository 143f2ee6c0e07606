//! Breadth-first resolution of model dependency closures
//!
//! One `resolve` call owns its own queue and result map; nothing is shared
//! across calls, so concurrent calls against the same repository are safe.
//! Fetches are performed strictly sequentially, one queue item at a time,
//! which keeps discovery order and dedup bookkeeping deterministic.

use std::collections::VecDeque;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dtmi::Dtmi;
use crate::error::{ResolverError, Result};
use crate::fetch::{FetchResult, LocalFetcher, ModelFetcher, RemoteFetcher, RepositoryLocation};
use crate::metadata;

/// How discovered dependencies are handled during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyResolution {
    /// Fetch only the requested models, no recursion.
    Disabled,
    /// Fetch the requested models and recurse into every discovered
    /// dependency.
    #[default]
    Enabled,
    /// Prefer a sibling `.expanded.json` file holding the precomputed
    /// closure; recursive per-dependency fetches are skipped when it exists.
    FromExpanded,
}

/// Client for resolving DTMIs against one model repository.
///
/// The fetch backend is selected once, at construction, from the location's
/// scheme.
pub struct RepositoryClient {
    location: RepositoryLocation,
    resolution: DependencyResolution,
    fetcher: Box<dyn ModelFetcher>,
}

impl RepositoryClient {
    /// Create a client with its own HTTP transport (remote locations only
    /// construct one when needed).
    pub fn new(location: RepositoryLocation, resolution: DependencyResolution) -> Self {
        if location.is_remote() {
            Self::with_http_client(location, resolution, reqwest::blocking::Client::new())
        } else {
            info!(repository = %location, "initializing client with local fetcher");
            Self {
                location,
                resolution,
                fetcher: Box::new(LocalFetcher),
            }
        }
    }

    /// Create a client that shares a caller-supplied HTTP transport.
    pub fn with_http_client(
        location: RepositoryLocation,
        resolution: DependencyResolution,
        client: reqwest::blocking::Client,
    ) -> Self {
        let fetcher: Box<dyn ModelFetcher> = if location.is_remote() {
            info!(repository = %location, "initializing client with remote fetcher");
            Box::new(RemoteFetcher::new(client))
        } else {
            info!(repository = %location, "initializing client with local fetcher");
            Box::new(LocalFetcher)
        };
        Self {
            location,
            resolution,
            fetcher,
        }
    }

    /// Convenience constructor for a local repository directory.
    pub fn from_local_repository(
        path: impl AsRef<Path>,
        resolution: DependencyResolution,
    ) -> Self {
        Self::new(
            RepositoryLocation::Local(path.as_ref().to_path_buf()),
            resolution,
        )
    }

    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    pub fn resolution(&self) -> DependencyResolution {
        self.resolution
    }

    /// The path or URL a DTMI would be fetched from.
    pub fn get_path(&self, dtmi: &str) -> Result<String> {
        let dtmi = Dtmi::new(dtmi)?;
        Ok(self.fetcher.get_path(&dtmi, &self.location))
    }

    /// Resolve a single DTMI. See [`RepositoryClient::resolve`].
    pub fn resolve_one(&self, dtmi: &str) -> Result<IndexMap<String, String>> {
        self.resolve(&[dtmi])
    }

    /// Resolve the given DTMIs and, depending on the resolution mode, the
    /// transitive closure of their dependencies.
    ///
    /// The returned map is in discovery order (breadth-first from the
    /// seeds) and contains each model exactly once. Any failure aborts the
    /// whole call; no partial results are returned.
    pub fn resolve(&self, dtmis: &[&str]) -> Result<IndexMap<String, String>> {
        // Every seed is validated before any I/O happens.
        let mut pending: VecDeque<Dtmi> = VecDeque::with_capacity(dtmis.len());
        for raw in dtmis {
            pending.push_back(Dtmi::new(*raw)?);
        }

        let mut resolved: IndexMap<String, String> = IndexMap::new();
        let try_expanded = self.resolution == DependencyResolution::FromExpanded;

        while let Some(target) = pending.pop_front() {
            if resolved.contains_key(target.as_str()) {
                debug!(dtmi = %target, "already resolved, skipping");
                continue;
            }
            info!(dtmi = %target, "processing");

            let fetched = self.fetcher.fetch(&target, &self.location, try_expanded)?;

            if fetched.expanded() {
                self.merge_expanded(&target, &fetched, &mut resolved)?;
                continue;
            }

            let meta = metadata::extract(&fetched.definition)?;
            if meta.id != target.as_str() {
                return Err(ResolverError::CasingMismatch {
                    requested: target.to_string(),
                    retrieved: meta.id,
                });
            }

            if self.resolution != DependencyResolution::Disabled {
                if !meta.dependencies.is_empty() {
                    debug!(dtmi = %target, dependencies = ?meta.dependencies, "discovered dependencies");
                }
                for dependency in &meta.dependencies {
                    // Duplicates are tolerated in the queue; the result map
                    // resolves them on dequeue.
                    pending.push_back(Dtmi::new(dependency.as_str())?);
                }
            }

            resolved.insert(target.to_string(), fetched.definition);
        }

        Ok(resolved)
    }

    /// Resolver callback contract for an external grammar validator: a DTMI
    /// set in, their definitions out.
    pub fn parser_dtmi_resolver(&self, dtmis: &[&str]) -> Result<Vec<String>> {
        Ok(self.resolve(dtmis)?.into_values().collect())
    }

    /// Merge a precomputed closure (a JSON array of model objects) into the
    /// result map, keyed by each member's own `@id`.
    fn merge_expanded(
        &self,
        target: &Dtmi,
        fetched: &FetchResult,
        resolved: &mut IndexMap<String, String>,
    ) -> Result<()> {
        let models: Vec<serde_json::Value> = serde_json::from_str(&fetched.definition)?;
        info!(dtmi = %target, count = models.len(), "merging precomputed closure");

        for model in &models {
            let id = model
                .get("@id")
                .and_then(serde_json::Value::as_str)
                .ok_or(ResolverError::MissingRootId)?;
            if resolved.contains_key(id) {
                debug!(dtmi = %id, "already resolved, skipping");
                continue;
            }
            resolved.insert(id.to_string(), serde_json::to_string(model)?);
        }

        // A closure that omits its own root would silently drop the
        // requested model from the result map.
        if !resolved.contains_key(target.as_str()) {
            return Err(ResolverError::ModelNotFound {
                dtmi: target.to_string(),
                path: fetched.path.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_seed_fails_before_any_io() {
        // The repository does not exist; an invalid seed must still be
        // reported as a format error, not a fetch error.
        let client =
            RepositoryClient::from_local_repository("/nonexistent", DependencyResolution::Enabled);
        let err = client
            .resolve(&["dtmi:com:example:Thermostat:1"])
            .unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDtmiFormat(_)));
    }

    #[test]
    fn test_get_path_validates_first() {
        let client =
            RepositoryClient::from_local_repository("/repo", DependencyResolution::Enabled);
        assert!(client.get_path("dtmi:com:example:Thermostat:1").is_err());
        assert_eq!(
            client.get_path("dtmi:com:example:Thermostat;1").unwrap(),
            "/repo/dtmi/com/example/thermostat-1.json"
        );
    }

    #[test]
    fn test_default_resolution_is_enabled() {
        assert_eq!(
            DependencyResolution::default(),
            DependencyResolution::Enabled
        );
    }
}
