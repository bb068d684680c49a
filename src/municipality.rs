//! Postal-code → municipality lookup table
//!
//! Loaded once from a JSON file at process start and read-only afterwards.

use crate::engine::traits::MunicipalityLookup;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One municipality record from the directory file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Municipality {
    pub name: String,
    /// The municipality's own site.
    pub link: String,
    /// Adult-education service page, where the municipality offers one.
    #[serde(default)]
    pub service_link: Option<String>,
    #[serde(default)]
    pub postal_codes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read municipality file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse municipality file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory directory keyed by five-digit postal code
pub struct MunicipalityDirectory {
    municipalities: Vec<Municipality>,
    by_code: HashMap<String, usize>,
}

impl MunicipalityDirectory {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DirectoryError> {
        let municipalities: Vec<Municipality> = serde_json::from_str(raw)?;

        let mut by_code = HashMap::new();
        for (index, municipality) in municipalities.iter().enumerate() {
            for code in &municipality.postal_codes {
                by_code.insert(code.clone(), index);
            }
        }

        Ok(Self {
            municipalities,
            by_code,
        })
    }

    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    #[allow(dead_code)] // Paired with len
    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }
}

impl MunicipalityLookup for MunicipalityDirectory {
    fn lookup(&self, postal_code: &str) -> Option<Municipality> {
        self.by_code
            .get(postal_code)
            .map(|&index| self.municipalities[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "name": "Solna",
            "link": "https://www.solna.se",
            "service_link": "https://www.solna.se/vuxenutbildning",
            "postal_codes": ["16936", "16970"]
        },
        {
            "name": "Knivsta",
            "link": "https://www.knivsta.se",
            "postal_codes": ["74175"]
        }
    ]"#;

    #[test]
    fn test_lookup_by_any_listed_code() {
        let directory = MunicipalityDirectory::from_json(SAMPLE).unwrap();
        assert_eq!(directory.len(), 2);

        let solna = directory.lookup("16970").unwrap();
        assert_eq!(solna.name, "Solna");
        assert_eq!(
            solna.service_link.as_deref(),
            Some("https://www.solna.se/vuxenutbildning")
        );

        let knivsta = directory.lookup("74175").unwrap();
        assert_eq!(knivsta.service_link, None);

        assert!(directory.lookup("11111").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let directory = MunicipalityDirectory::load(file.path()).unwrap();
        assert!(directory.lookup("16936").is_some());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(matches!(
            MunicipalityDirectory::from_json("{\"not\": \"a list\"}"),
            Err(DirectoryError::Parse(_))
        ));
    }
}
