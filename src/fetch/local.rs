//! Filesystem fetch backend

use std::fs;
use std::path::Path;

use tracing::{debug, error, warn};

use super::{FetchResult, ModelFetcher, RepositoryLocation};
use crate::convention;
use crate::dtmi::Dtmi;
use crate::error::{ResolverError, Result};

/// Reads model definitions from a local repository directory.
pub struct LocalFetcher;

impl ModelFetcher for LocalFetcher {
    fn get_path(&self, dtmi: &Dtmi, location: &RepositoryLocation) -> String {
        convention::dtmi_to_qualified_path(dtmi, &location.base(), false)
    }

    fn fetch(
        &self,
        dtmi: &Dtmi,
        location: &RepositoryLocation,
        try_expanded: bool,
    ) -> Result<FetchResult> {
        let base = location.base();
        if !Path::new(&base).is_dir() {
            error!(repository = %base, "repository directory not found");
            return Err(ResolverError::RepositoryNotFound { path: base });
        }

        let model_path = convention::dtmi_to_qualified_path(dtmi, &base, false);

        if try_expanded {
            let expanded_path = convention::dtmi_to_qualified_path(dtmi, &base, true);
            if Path::new(&expanded_path).is_file() {
                let definition = fs::read_to_string(&expanded_path)?;
                return Ok(FetchResult {
                    definition,
                    path: expanded_path,
                });
            }
            debug!(path = %expanded_path, "expanded model not available, falling back");
        }

        if !Path::new(&model_path).is_file() {
            warn!(dtmi = %dtmi, path = %model_path, "model file not found");
            return Err(ResolverError::ModelNotFound {
                dtmi: dtmi.to_string(),
                path: model_path,
            });
        }

        let definition = fs::read_to_string(&model_path)?;
        Ok(FetchResult {
            definition,
            path: model_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_repository_is_distinct_from_missing_model() {
        let dtmi = Dtmi::new("dtmi:com:example:Thermostat;1").unwrap();
        let fetcher = LocalFetcher;

        let absent = RepositoryLocation::Local("/nonexistent/repo/root".into());
        assert!(matches!(
            fetcher.fetch(&dtmi, &absent, false),
            Err(ResolverError::RepositoryNotFound { .. })
        ));

        let dir = tempdir().unwrap();
        let empty = RepositoryLocation::Local(dir.path().to_path_buf());
        let err = fetcher.fetch(&dtmi, &empty, false).unwrap_err();
        match err {
            ResolverError::ModelNotFound { path, .. } => {
                assert!(path.ends_with("dtmi/com/example/thermostat-1.json"));
            }
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_expanded_probe_falls_back_to_plain_file() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("dtmi/com/example");
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(
            model_dir.join("thermostat-1.json"),
            r#"{"@id": "dtmi:com:example:Thermostat;1"}"#,
        )
        .unwrap();

        let dtmi = Dtmi::new("dtmi:com:example:Thermostat;1").unwrap();
        let location = RepositoryLocation::Local(dir.path().to_path_buf());
        let result = LocalFetcher.fetch(&dtmi, &location, true).unwrap();
        assert!(!result.expanded());
        assert!(result.definition.contains("Thermostat"));
    }
}
