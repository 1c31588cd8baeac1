//! Discovery and filtering phases
//!
//! Walks the configured directories, loads every file on the extension
//! whitelist, and applies the configured filters. Files are visited in
//! sorted path order so discovery output is stable across runs.

use std::path::{Path, PathBuf};

use log::warn;

use crate::providers::DocumentParser;

use super::config::BulkProcessingConfig;
use super::document::{load_document, CaselawDocument};

/// Outcome of the discovery phase
pub struct DiscoveryResult {
    pub documents: Vec<CaselawDocument>,
    /// Files with a supported extension, before filtering
    pub total_discovered: usize,
    /// Files that failed to load
    pub load_errors: usize,
}

/// Discover and load candidate documents from the configured directories
pub fn discover(config: &BulkProcessingConfig, parser: &dyn DocumentParser) -> DiscoveryResult {
    let mut paths: Vec<PathBuf> = Vec::new();
    for directory in &config.caselaw_directories {
        if !directory.exists() {
            warn!("caselaw directory not found: {}", directory.display());
            continue;
        }
        collect_files(directory, &config.supported_extensions, &mut paths);
    }
    paths.sort();

    let total_discovered = paths.len();
    let mut documents = Vec::new();
    let mut load_errors = 0usize;
    for path in paths {
        match load_document(&path, parser) {
            Ok(doc) => documents.push(doc),
            Err(err) => {
                warn!("failed to load {}: {err}", path.display());
                load_errors += 1;
            }
        }
    }

    DiscoveryResult {
        documents,
        total_discovered,
        load_errors,
    }
}

fn collect_files(directory: &Path, extensions: &[String], out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot read directory {}: {err}", directory.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, extensions, out);
        } else if has_supported_extension(&path, extensions) {
            out.push(path);
        }
    }
}

fn has_supported_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| extensions.iter().any(|allowed| *allowed == ext))
}

/// Whether a document passes every configured filter
pub fn passes_filters(doc: &CaselawDocument, config: &BulkProcessingConfig) -> bool {
    if doc.text.len() < config.min_document_length {
        return false;
    }
    if let Some(earliest) = config.date_range.0 {
        if doc.date < earliest {
            return false;
        }
    }
    if let Some(latest) = config.date_range.1 {
        if doc.date > latest {
            return false;
        }
    }
    if let Some(jurisdictions) = &config.jurisdictions_filter {
        if !jurisdictions.contains(&doc.jurisdiction) {
            return false;
        }
    }
    if let Some(domains) = &config.legal_domains_filter {
        if !doc.legal_domains.iter().any(|d| domains.contains(d)) {
            return false;
        }
    }
    doc.precedent_strength >= config.min_precedent_strength
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::PlainTextParser;
    use chrono::{TimeZone, Utc};

    fn long_body() -> String {
        "The contractor must provide written notice before termination. ".repeat(4)
    }

    #[test]
    fn test_discovery_respects_extension_whitelist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("case_2020.txt"), long_body()).unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignore me").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8; 10]).unwrap();

        let config =
            BulkProcessingConfig::for_directories(vec![dir.path().to_path_buf()]);
        let result = discover(&config, &PlainTextParser);
        assert_eq!(result.total_discovered, 1);
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.load_errors, 0);
    }

    #[test]
    fn test_discovery_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("federal");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("b_2020.txt"), long_body()).unwrap();
        std::fs::write(dir.path().join("a_2019.txt"), long_body()).unwrap();

        let config =
            BulkProcessingConfig::for_directories(vec![dir.path().to_path_buf()]);
        let result = discover(&config, &PlainTextParser);
        assert_eq!(result.documents.len(), 2);
        // Sorted path order: a_2019.txt at the root before federal/b_2020.txt.
        assert_eq!(result.documents[0].document_id, "a_2019");
    }

    #[test]
    fn test_missing_directory_is_not_fatal() {
        let config = BulkProcessingConfig::for_directories(vec![PathBuf::from(
            "/nonexistent/caselaw/archive",
        )]);
        let result = discover(&config, &PlainTextParser);
        assert_eq!(result.total_discovered, 0);
        assert!(result.documents.is_empty());
    }

    #[test]
    fn test_filters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case_2010.txt");
        std::fs::write(&path, long_body()).unwrap();
        let config = BulkProcessingConfig::for_directories(vec![dir.path().to_path_buf()]);
        let doc = load_document(&path, &PlainTextParser).unwrap();

        assert!(passes_filters(&doc, &config));

        let mut short = config.clone();
        short.min_document_length = 100_000;
        assert!(!passes_filters(&doc, &short));

        let mut dated = config.clone();
        dated.date_range.0 = Some(Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap());
        assert!(!passes_filters(&doc, &dated));

        let mut jurisdiction = config.clone();
        jurisdiction.jurisdictions_filter = Some(vec!["Federal".to_string()]);
        assert!(!passes_filters(&doc, &jurisdiction));

        let mut strength = config;
        strength.min_precedent_strength = 2.0;
        assert!(!passes_filters(&doc, &strength));
    }
}
