//! The tracked-organizations seed file.
//!
//! Organizations are normally managed through the CLI; the YAML file is a
//! convenience for bootstrapping a fresh store with a known watchlist.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub name: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationsFile {
    pub organizations: Vec<OrganizationConfig>,
}

/// Load and validate the organizations seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_organizations(path: &Path) -> Result<OrganizationsFile, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::OrganizationsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;

    let file: OrganizationsFile = serde_yaml::from_str(&content)?;

    validate_organizations(&file)?;

    Ok(file)
}

fn validate_organizations(file: &OrganizationsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for org in &file.organizations {
        if org.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "organization name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(org.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate organization name: '{}'",
                org.name
            )));
        }

        let mut seen_synonyms = HashSet::new();
        for synonym in &org.synonyms {
            if synonym.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "organization '{}' has an empty synonym",
                    org.name
                )));
            }
            if !seen_synonyms.insert(synonym.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "organization '{}' has duplicate synonym '{synonym}'",
                    org.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watchlist_with_synonyms() {
        let yaml = r"
organizations:
  - name: Acme
    synonyms:
      - Acme Corp
      - Acme Inc.
  - name: Globex
";
        let file: OrganizationsFile = serde_yaml::from_str(yaml).expect("should parse");
        validate_organizations(&file).expect("should validate");
        assert_eq!(file.organizations.len(), 2);
        assert_eq!(file.organizations[0].synonyms.len(), 2);
        assert!(file.organizations[1].synonyms.is_empty());
    }

    #[test]
    fn rejects_empty_organization_name() {
        let yaml = r"
organizations:
  - name: ''
";
        let file: OrganizationsFile = serde_yaml::from_str(yaml).expect("should parse");
        let result = validate_organizations(&file);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_synonym() {
        let yaml = r"
organizations:
  - name: Acme
    synonyms: [Acme Corp, Acme Corp]
";
        let file: OrganizationsFile = serde_yaml::from_str(yaml).expect("should parse");
        let result = validate_organizations(&file);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
