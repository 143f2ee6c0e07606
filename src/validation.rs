//! Strict-mode structural validators
//!
//! Pure checks over already-fetched content; none of these perform I/O.
//! Namespace and reserved-word scans accumulate every violation before
//! reporting instead of stopping at the first. Strict mode requires a
//! single root model object; array input is rejected upfront.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::convention;
use crate::dtmi::Dtmi;
use crate::error::{ResolverError, Result};
use crate::metadata;

/// Matches every `"@id": "..."` attribute in raw model text.
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""@id":\s?"([^"]*)""#).unwrap());

/// Matches the trailing `;version` of a DTMI.
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";[1-9][0-9]{0,8}$").unwrap());

/// Vendor-reserved substrings that must not appear in model ids.
pub const DEFAULT_RESERVED_WORDS: [&str; 2] = ["Microsoft", "Azure"];

/// The root id with its trailing `;version` stripped.
pub fn dtmi_namespace(root_id: &str) -> String {
    VERSION_SUFFIX.replace(root_id, "").into_owned()
}

/// Structural validator for strict-mode repository checks.
pub struct StrictValidator {
    reserved: Regex,
}

impl Default for StrictValidator {
    fn default() -> Self {
        Self::new(&DEFAULT_RESERVED_WORDS.map(String::from))
    }
}

impl StrictValidator {
    /// Build a validator flagging ids that case-insensitively contain any of
    /// `reserved_words`. An empty list disables the reserved-word scan.
    pub fn new(reserved_words: &[String]) -> Self {
        let pattern = if reserved_words.is_empty() {
            // matches nothing
            "$^".to_string()
        } else {
            format!(
                "(?i){}",
                reserved_words
                    .iter()
                    .map(|word| regex::escape(word))
                    .collect::<Vec<_>>()
                    .join("|")
            )
        };
        Self {
            reserved: Regex::new(&pattern).unwrap(),
        }
    }

    /// Every nested `@id` must begin with the root id's namespace.
    pub fn ensure_namespace(&self, definition: &str) -> Result<()> {
        ensure_single_model(definition)?;
        let root_id = metadata::get_root_id(definition)?;
        let namespace = dtmi_namespace(&root_id);

        let offenders: Vec<String> = find_all_ids(definition)
            .into_iter()
            .filter(|id| !id.starts_with(&namespace))
            .collect();

        if offenders.is_empty() {
            Ok(())
        } else {
            Err(ResolverError::NamespaceViolation {
                namespace,
                offenders,
            })
        }
    }

    /// No id may contain a vendor-reserved substring.
    pub fn scan_reserved_words(&self, definition: &str) -> Result<()> {
        ensure_single_model(definition)?;

        let offenders: Vec<String> = find_all_ids(definition)
            .into_iter()
            .filter(|id| self.reserved.is_match(id))
            .collect();

        if offenders.is_empty() {
            Ok(())
        } else {
            Err(ResolverError::ReservedWordViolation { offenders })
        }
    }

    /// The file's path must equal the path convention applied to its own
    /// root id, relative to the repository root.
    pub fn ensure_path_convention(
        &self,
        definition: &str,
        file_path: &Path,
        repo_root: &Path,
    ) -> Result<()> {
        ensure_single_model(definition)?;
        let root_id = metadata::get_root_id(definition)?;
        let dtmi = Dtmi::new(root_id)?;

        let expected =
            convention::dtmi_to_qualified_path(&dtmi, &repo_root.display().to_string(), false);
        if Path::new(&expected).components().eq(file_path.components()) {
            Ok(())
        } else {
            Err(ResolverError::PathConventionViolation { expected })
        }
    }
}

/// Pull the value of every `"@id"` attribute out of raw model text.
fn find_all_ids(definition: &str) -> Vec<String> {
    ID_REGEX
        .captures_iter(definition)
        .map(|captures| captures[1].to_string())
        .collect()
}

fn ensure_single_model(definition: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(definition)?;
    if value.is_array() {
        return Err(ResolverError::StrictModeArrayInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const THERMOSTAT: &str = r#"{
        "@id": "dtmi:com:example:Thermostat;1",
        "@type": "Interface",
        "contents": [
            {"@id": "dtmi:com:example:Thermostat:Sub;1", "@type": "Telemetry", "name": "t", "schema": "double"}
        ]
    }"#;

    #[test]
    fn test_namespace_conformance_ok() {
        assert!(StrictValidator::default()
            .ensure_namespace(THERMOSTAT)
            .is_ok());
    }

    #[test]
    fn test_namespace_violation_collects_all_offenders() {
        let definition = r#"{
            "@id": "dtmi:com:example:Thermostat;1",
            "contents": [
                {"@id": "dtmi:other:Thing;1"},
                {"@id": "dtmi:com:example:Thermostat:Sub;1"},
                {"@id": "dtmi:another:Thing;1"}
            ]
        }"#;
        let err = StrictValidator::default()
            .ensure_namespace(definition)
            .unwrap_err();
        match err {
            ResolverError::NamespaceViolation {
                namespace,
                offenders,
            } => {
                assert_eq!(namespace, "dtmi:com:example:Thermostat");
                assert_eq!(
                    offenders,
                    vec!["dtmi:other:Thing;1", "dtmi:another:Thing;1"]
                );
            }
            other => panic!("expected NamespaceViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_reserved_word_scan_is_case_insensitive() {
        let definition = r#"{
            "@id": "dtmi:com:example:Thermostat;1",
            "contents": [
                {"@id": "dtmi:com:example:Thermostat:azureSub;1"},
                {"@id": "dtmi:com:example:Thermostat:MICROSOFTSub;1"},
                {"@id": "dtmi:com:example:Thermostat:Sub;1"}
            ]
        }"#;
        let err = StrictValidator::default()
            .scan_reserved_words(definition)
            .unwrap_err();
        match err {
            ResolverError::ReservedWordViolation { offenders } => {
                assert_eq!(offenders.len(), 2);
            }
            other => panic!("expected ReservedWordViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_reserved_words() {
        let validator = StrictValidator::new(&["Contoso".to_string()]);
        let definition = r#"{"@id": "dtmi:com:contoso:Thing;1"}"#;
        assert!(validator.scan_reserved_words(definition).is_err());
        assert!(StrictValidator::default()
            .scan_reserved_words(definition)
            .is_ok());
    }

    #[test]
    fn test_path_convention() {
        let validator = StrictValidator::default();
        let root = Path::new("/repo");

        assert!(validator
            .ensure_path_convention(
                THERMOSTAT,
                Path::new("/repo/dtmi/com/example/thermostat-1.json"),
                root
            )
            .is_ok());

        let err = validator
            .ensure_path_convention(
                THERMOSTAT,
                Path::new("/repo/dtmi/com/example/Thermostat-1.json"),
                root,
            )
            .unwrap_err();
        match err {
            ResolverError::PathConventionViolation { expected } => {
                assert_eq!(expected, "/repo/dtmi/com/example/thermostat-1.json");
            }
            other => panic!("expected PathConventionViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_array_input_rejected_upfront() {
        let array = r#"[{"@id": "dtmi:com:example:Thermostat;1"}]"#;
        let validator = StrictValidator::default();
        assert!(matches!(
            validator.ensure_namespace(array),
            Err(ResolverError::StrictModeArrayInput)
        ));
        assert!(matches!(
            validator.scan_reserved_words(array),
            Err(ResolverError::StrictModeArrayInput)
        ));
    }

    #[test]
    fn test_dtmi_namespace_strips_version() {
        assert_eq!(
            dtmi_namespace("dtmi:com:example:Thermostat;1"),
            "dtmi:com:example:Thermostat"
        );
        assert_eq!(
            dtmi_namespace("dtmi:com:example:Thermostat"),
            "dtmi:com:example:Thermostat"
        );
    }
}
