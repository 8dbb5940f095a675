use std::sync::Arc;

use crate::config::SiteEntry;
use crate::error::ConfigError;
use crate::extract::{Extractor, NoopExtractor, Schema};

pub struct Site {
    pub pattern: String,
    pub extractor: Arc<dyn Extractor>,
}

/// Ordered list of address substrings and the extractor each one selects.
/// The first entry whose pattern occurs in the page address wins.
pub struct SiteRegistry {
    sites: Vec<Site>,
    fallback: Arc<dyn Extractor>,
}

impl Default for SiteRegistry {
    fn default() -> Self {
        let mut registry = SiteRegistry::empty();
        for schema in Schema::ALL {
            registry.register(schema.site_pattern(), Arc::from(schema.extractor()));
        }
        registry
    }
}

impl SiteRegistry {
    pub fn empty() -> Self {
        SiteRegistry {
            sites: Vec::new(),
            fallback: Arc::new(NoopExtractor),
        }
    }

    /// Built-in sites followed by the configured ones.
    pub fn with_entries(entries: &[SiteEntry]) -> Result<Self, ConfigError> {
        let mut registry = SiteRegistry::default();
        for entry in entries {
            if entry.pattern.trim().is_empty() {
                return Err(ConfigError::EmptyPattern);
            }
            let schema = Schema::from_str(&entry.schema).ok_or_else(|| ConfigError::UnknownSchema {
                pattern: entry.pattern.clone(),
                schema: entry.schema.clone(),
            })?;
            registry.register(&entry.pattern, Arc::from(schema.extractor()));
        }
        Ok(registry)
    }

    pub fn register(&mut self, pattern: &str, extractor: Arc<dyn Extractor>) {
        self.sites.push(Site {
            pattern: pattern.to_string(),
            extractor,
        });
    }

    pub fn resolve(&self, url: &str) -> Arc<dyn Extractor> {
        self.sites
            .iter()
            .find(|site| url.contains(site.pattern.as_str()))
            .map(|site| site.extractor.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }
}
