//! Caselaw documents and metadata heuristics
//!
//! JSON documents carry their own metadata; everything else gets dates and
//! jurisdictions inferred from the filename and path.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::warn;
use regex::Regex;
use serde::Deserialize;

use crate::error::{JurisError, JurisResult};
use crate::providers::DocumentParser;

/// Default date for documents with no recoverable date
fn epoch_2000() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixed date")
}

/// A single caselaw document queued for processing
#[derive(Debug, Clone, PartialEq)]
pub struct CaselawDocument {
    pub document_id: String,
    pub title: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub jurisdiction: String,
    pub court: String,
    pub citation: String,
    pub legal_domains: Vec<String>,
    pub precedent_strength: f64,
    pub file_path: Option<PathBuf>,
}

impl CaselawDocument {
    /// Source-case label used on theorems extracted from this document
    pub fn source_case_label(&self) -> String {
        format!("{} ({})", self.title, self.date.format("%Y"))
    }

    /// Primary legal domain, defaulting to "general"
    pub fn primary_domain(&self) -> &str {
        self.legal_domains
            .first()
            .map(String::as_str)
            .unwrap_or("general")
    }
}

/// JSON caselaw format accepted during discovery
#[derive(Debug, Deserialize)]
struct JsonCaselaw {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "content")]
    text: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    jurisdiction: Option<String>,
    #[serde(default)]
    court: Option<String>,
    #[serde(default)]
    citation: Option<String>,
    #[serde(default)]
    legal_domains: Vec<String>,
    #[serde(default)]
    precedent_strength: Option<f64>,
}

/// Load a document, choosing the loader by extension
pub fn load_document(path: &Path, parser: &dyn DocumentParser) -> JurisResult<CaselawDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "json" => load_json_document(path),
        "txt" => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| JurisError::IoError {
                    message: format!("{}: {e}", path.display()),
                })?;
            Ok(document_from_heuristics(path, text))
        }
        // xml/pdf bodies come through the configured parser; the core
        // treats the result as plain text.
        _ => {
            let text = parser.extract_text(path)?;
            Ok(document_from_heuristics(path, text))
        }
    }
}

fn load_json_document(path: &Path) -> JurisResult<CaselawDocument> {
    let raw = std::fs::read_to_string(path).map_err(|e| JurisError::IoError {
        message: format!("{}: {e}", path.display()),
    })?;
    let parsed: JsonCaselaw = serde_json::from_str(&raw).map_err(|e| {
        JurisError::extraction_error(format!("malformed JSON in {}: {e}", path.display()))
    })?;

    let stem = file_stem(path);
    let date = match parsed.date.as_deref() {
        Some(raw_date) => parse_date(raw_date).unwrap_or_else(|| {
            warn!("unparseable date '{raw_date}' in {}; defaulting", path.display());
            epoch_2000()
        }),
        None => date_from_filename(&stem).unwrap_or_else(epoch_2000),
    };

    let legal_domains = if parsed.legal_domains.is_empty() {
        vec!["general".to_string()]
    } else {
        parsed.legal_domains
    };

    Ok(CaselawDocument {
        document_id: parsed.id.unwrap_or_else(|| stem.clone()),
        title: parsed.title.unwrap_or_else(|| file_name(path)),
        text: parsed.text.unwrap_or_default(),
        date,
        jurisdiction: parsed
            .jurisdiction
            .unwrap_or_else(|| jurisdiction_from_path(path)),
        court: parsed.court.unwrap_or_else(|| "Unknown Court".to_string()),
        citation: parsed.citation.unwrap_or_default(),
        legal_domains,
        precedent_strength: parsed.precedent_strength.unwrap_or(1.0).clamp(0.0, 1.0),
        file_path: Some(path.to_path_buf()),
    })
}

fn document_from_heuristics(path: &Path, text: String) -> CaselawDocument {
    let stem = file_stem(path);
    CaselawDocument {
        document_id: stem.clone(),
        title: file_name(path),
        text,
        date: date_from_filename(&stem).unwrap_or_else(epoch_2000),
        jurisdiction: jurisdiction_from_path(path),
        court: "Unknown Court".to_string(),
        citation: String::new(),
        legal_domains: vec!["general".to_string()],
        precedent_strength: 1.0,
        file_path: Some(path.to_path_buf()),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}

/// Parse an ISO date or datetime string
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// First 4-digit number in the filename becomes the document year
pub fn date_from_filename(name: &str) -> Option<DateTime<Utc>> {
    let year_pattern = Regex::new(r"\d{4}").expect("static year pattern");
    let year: i32 = year_pattern.find(name)?.as_str().parse().ok()?;
    if !(1500..=2999).contains(&year) {
        return None;
    }
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}

/// State names recognized by the jurisdiction heuristic
const STATE_MARKERS: &[&str] = &[
    "california",
    "texas",
    "new_york",
    "new york",
    "florida",
    "illinois",
    "ohio",
    "washington",
    "massachusetts",
];

/// Infer jurisdiction from path segments
pub fn jurisdiction_from_path(path: &Path) -> String {
    let lower = path.to_string_lossy().to_lowercase();
    if lower.contains("federal") || lower.contains("supreme") {
        "Federal".to_string()
    } else if STATE_MARKERS.iter().any(|s| lower.contains(s)) {
        "State".to_string()
    } else if lower.contains("international") {
        "International".to_string()
    } else {
        "Unknown".to_string()
    }
}
