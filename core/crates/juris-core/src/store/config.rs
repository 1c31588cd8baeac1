//! RAG store configuration

use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for a [`TemporalDeonticRagStore`]
///
/// [`TemporalDeonticRagStore`]: super::TemporalDeonticRagStore
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Dimension every stored embedding must have
    pub embedding_dimension: usize,
    /// Result count used when a caller does not specify top_k
    pub default_top_k: usize,
    /// Ceiling on top_k; larger requests are clamped
    pub max_top_k: usize,
    /// Domain filter widening: filter domain -> additionally accepted domains
    pub related_domains: BTreeMap<String, Vec<String>>,
    /// Deadline for each embedding provider call
    pub embedding_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: 384,
            default_top_k: 10,
            max_top_k: 50,
            related_domains: BTreeMap::new(),
            embedding_timeout: Duration::from_secs(30),
        }
    }
}

impl StoreConfig {
    /// Register a related-domain widening for the domain filter
    pub fn relate_domains(mut self, domain: impl Into<String>, related: Vec<String>) -> Self {
        self.related_domains.insert(domain.into(), related);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.default_top_k, 10);
        assert_eq!(config.max_top_k, 50);
        assert!(config.related_domains.is_empty());
    }

    #[test]
    fn test_relate_domains() {
        let config = StoreConfig::default()
            .relate_domains("employment", vec!["labor".into(), "contract".into()]);
        assert_eq!(config.related_domains["employment"].len(), 2);
    }
}
