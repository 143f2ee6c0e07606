//! Deterministic DTMI to storage-path mapping
//!
//! `dtmi:com:example:Thermostat;1` is stored at
//! `dtmi/com/example/thermostat-1.json` relative to the repository root:
//! labels lowercased, `:` between labels replaced with `/`, the final `;`
//! replaced with `-`. A sibling `thermostat-1.expanded.json` may hold the
//! model's precomputed dependency closure as a JSON array.

use crate::dtmi::Dtmi;

/// File extension for individual model definitions.
pub const MODEL_EXTENSION: &str = ".json";

/// File extension for precomputed dependency closures.
pub const EXPANDED_EXTENSION: &str = ".expanded.json";

/// Map a DTMI to its repository-relative storage path.
///
/// Pure and deterministic: identical identifiers always yield identical
/// output regardless of input casing.
pub fn dtmi_to_path(dtmi: &Dtmi) -> String {
    format!(
        "{}{}",
        dtmi.as_str()
            .to_lowercase()
            .replace(':', "/")
            .replace(';', "-"),
        MODEL_EXTENSION
    )
}

/// Map a DTMI to its full path under `base`, which may be a local directory
/// or a remote URL prefix.
pub fn dtmi_to_qualified_path(dtmi: &Dtmi, base: &str, expanded: bool) -> String {
    let relative = dtmi
        .as_str()
        .to_lowercase()
        .replace(':', "/")
        .replace(';', "-");
    let extension = if expanded {
        EXPANDED_EXTENSION
    } else {
        MODEL_EXTENSION
    };
    format!("{}/{}{}", base.trim_end_matches('/'), relative, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtmi_to_path() {
        let dtmi = Dtmi::new("dtmi:com:example:Thermostat;1").unwrap();
        assert_eq!(dtmi_to_path(&dtmi), "dtmi/com/example/thermostat-1.json");
    }

    #[test]
    fn test_qualified_path_local_base() {
        let dtmi = Dtmi::new("dtmi:com:example:Thermostat;1").unwrap();
        assert_eq!(
            dtmi_to_qualified_path(&dtmi, "/repo", false),
            "/repo/dtmi/com/example/thermostat-1.json"
        );
        // trailing slash on the base makes no difference
        assert_eq!(
            dtmi_to_qualified_path(&dtmi, "/repo/", false),
            "/repo/dtmi/com/example/thermostat-1.json"
        );
    }

    #[test]
    fn test_qualified_path_is_casing_insensitive() {
        let upper = Dtmi::new("dtmi:COM:Example:THERMOSTAT;1").unwrap();
        let lower = Dtmi::new("dtmi:com:example:thermostat;1").unwrap();
        assert_eq!(
            dtmi_to_qualified_path(&upper, "/repo", false),
            dtmi_to_qualified_path(&lower, "/repo", false)
        );
    }

    #[test]
    fn test_expanded_path() {
        let dtmi = Dtmi::new("dtmi:com:example:TemperatureController;1").unwrap();
        assert_eq!(
            dtmi_to_qualified_path(&dtmi, "https://repo.example.com", true),
            "https://repo.example.com/dtmi/com/example/temperaturecontroller-1.expanded.json"
        );
    }
}
