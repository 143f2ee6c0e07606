//! HTTP fetch backend
//!
//! One GET per fetch against `location/path`; no retries, no auth. The
//! transport client is supplied by the caller so it can be shared across
//! clients rather than held as ambient global state.

use tracing::debug;

use super::{FetchResult, ModelFetcher, RepositoryLocation};
use crate::convention;
use crate::dtmi::Dtmi;
use crate::error::{ResolverError, Result};

/// Fetches model definitions from a remote repository over HTTP.
pub struct RemoteFetcher {
    client: reqwest::blocking::Client,
}

impl RemoteFetcher {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    fn get_text(&self, url: &str) -> std::result::Result<String, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }
        response.text().map_err(|e| e.to_string())
    }
}

impl ModelFetcher for RemoteFetcher {
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

        if try_expanded {
            let expanded_url = convention::dtmi_to_qualified_path(dtmi, &base, true);
            match self.get_text(&expanded_url) {
                Ok(definition) => {
                    return Ok(FetchResult {
                        definition,
                        path: expanded_url,
                    })
                }
                Err(reason) => {
                    debug!(url = %expanded_url, %reason, "expanded model not available, falling back");
                }
            }
        }

        let url = convention::dtmi_to_qualified_path(dtmi, &base, false);
        match self.get_text(&url) {
            Ok(definition) => Ok(FetchResult { definition, path: url }),
            Err(reason) => Err(ResolverError::TransportFailure {
                dtmi: dtmi.to_string(),
                url,
                reason,
            }),
        }
    }
}
