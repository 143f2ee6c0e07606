//! Paged repository index builder
//!
//! Scans a local repository for model files and emits index pages: JSON
//! documents mapping each DTMI to its display name and description, linked
//! to one another through `self`/`next`/`prev`. Index building is
//! single-threaded and single-pass; pages are written incrementally as they
//! fill.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::convention::{EXPANDED_EXTENSION, MODEL_EXTENSION};
use crate::error::{ResolverError, Result};

/// Default number of entries per index page.
pub const DEFAULT_PAGE_LIMIT: usize = 2048;

/// One model's entry in the repository index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIndexEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Navigation links between index pages.
///
/// `next` is present iff a following page exists, `prev` iff a preceding
/// one does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// One page of the repository index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelIndexPage {
    pub links: PageLinks,
    pub models: IndexMap<String, ModelIndexEntry>,
}

impl ModelIndexPage {
    fn new(self_link: String) -> Self {
        Self {
            links: PageLinks {
                self_link,
                next: None,
                prev: None,
            },
            models: IndexMap::new(),
        }
    }
}

/// Outcome of an index build.
#[derive(Debug, Clone, Copy)]
pub struct IndexStats {
    pub models: usize,
    pub pages: usize,
}

/// Build a paged index for the repository rooted at `repo_root`, writing the
/// first page to `first_page` and subsequent pages beside it. A `page_limit`
/// of zero is treated as one.
///
/// Any error while processing a single model file aborts the whole build;
/// pages flushed before the failure remain on disk, buffered entries of the
/// in-progress page are dropped.
pub fn build_index(repo_root: &Path, first_page: &Path, page_limit: usize) -> Result<IndexStats> {
    // A zero limit would flush an empty first page and then never again.
    let page_limit = page_limit.max(1);

    let mut files: Vec<PathBuf> = WalkDir::new(repo_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_model_file(p, first_page))
        .collect();
    files.sort();

    info!(repository = %repo_root.display(), files = files.len(), "building index");

    let mut page = ModelIndexPage::new(path_string(first_page));
    let mut pages_written = 0usize;
    let mut total = 0usize;

    for path in files {
        if page.models.len() == page_limit {
            // Page is full and more entries are coming: pre-assign the next
            // page's path, link forward, flush, then link the fresh page back.
            let next_link = path_string(&page_path(first_page, pages_written + 2));
            let prev_link = page.links.self_link.clone();
            page.links.next = Some(next_link.clone());
            write_page(&page)?;
            pages_written += 1;

            page = ModelIndexPage::new(next_link);
            page.links.prev = Some(prev_link);
        }

        let (dtmi, entry) = index_entry(&path).map_err(|e| ResolverError::ProcessingError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(dtmi = %dtmi, path = %path.display(), "indexed model");
        page.models.insert(dtmi, entry);
        total += 1;
    }

    // Final page is flushed even when partially filled, and even when it is
    // the only page.
    write_page(&page)?;
    pages_written += 1;

    info!(models = total, pages = pages_written, "index build complete");
    Ok(IndexStats {
        models: total,
        pages: pages_written,
    })
}

/// Model files carry the model extension; expanded closures and previously
/// emitted index pages are excluded.
fn is_model_file(path: &Path, first_page: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !name.ends_with(MODEL_EXTENSION) || name.ends_with(EXPANDED_EXTENSION) {
        return false;
    }
    let Some(index_name) = first_page.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    let index_stem = index_name.strip_suffix(MODEL_EXTENSION).unwrap_or(index_name);
    name != index_name && !name.starts_with(&format!("{}.page.", index_stem))
}

/// Subsequent pages are numbered siblings of the first:
/// `index.json`, `index.page.2.json`, `index.page.3.json`, ...
fn page_path(first_page: &Path, number: usize) -> PathBuf {
    let name = first_page
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("index.json");
    let stem = name.strip_suffix(MODEL_EXTENSION).unwrap_or(name);
    first_page.with_file_name(format!("{}.page.{}{}", stem, number, MODEL_EXTENSION))
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

fn write_page(page: &ModelIndexPage) -> Result<()> {
    let content = serde_json::to_string_pretty(page)?;
    fs::write(&page.links.self_link, content)?;
    debug!(page = %page.links.self_link, entries = page.models.len(), "flushed index page");
    Ok(())
}

fn index_entry(path: &Path) -> Result<(String, ModelIndexEntry)> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let id = value
        .get("@id")
        .and_then(Value::as_str)
        .ok_or(ResolverError::MissingRootId)?
        .to_string();

    let entry = ModelIndexEntry {
        display_name: localized_string(value.get("displayName")),
        description: localized_string(value.get("description")),
    };
    Ok((id, entry))
}

/// DTDL display strings are either plain strings or localization maps; take
/// the `en` value or the first entry for maps.
fn localized_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("en")
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(Value::as_str))
            .map(ToString::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path_numbering() {
        let first = Path::new("/repo/index.json");
        assert_eq!(page_path(first, 2), PathBuf::from("/repo/index.page.2.json"));
        assert_eq!(page_path(first, 3), PathBuf::from("/repo/index.page.3.json"));
    }

    #[test]
    fn test_model_file_filter() {
        let first = Path::new("/repo/index.json");
        assert!(is_model_file(
            Path::new("/repo/dtmi/com/example/thermostat-1.json"),
            first
        ));
        assert!(!is_model_file(
            Path::new("/repo/dtmi/com/example/thermostat-1.expanded.json"),
            first
        ));
        assert!(!is_model_file(Path::new("/repo/index.json"), first));
        assert!(!is_model_file(Path::new("/repo/index.page.2.json"), first));
        assert!(!is_model_file(Path::new("/repo/readme.md"), first));
    }

    #[test]
    fn test_localized_string_forms() {
        let plain = serde_json::json!("Thermostat");
        assert_eq!(
            localized_string(Some(&plain)),
            Some("Thermostat".to_string())
        );

        let localized = serde_json::json!({"en": "Thermostat", "de": "Thermostat (de)"});
        assert_eq!(
            localized_string(Some(&localized)),
            Some("Thermostat".to_string())
        );

        assert_eq!(localized_string(None), None);
    }
}
