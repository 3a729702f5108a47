// ABOUTME: Loads site configurations from a YAML mapping of site name to config body.
// ABOUTME: Fills site_name from the mapping key and reports malformed files as Config errors.

//! Site configuration loader.
//!
//! The file format is a single YAML mapping:
//!
//! ```yaml
//! example.com:
//!   start_url: https://example.com/news
//!   article:
//!     content:
//!       select_method: xpath
//!       select_expression: //div[@class="story"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::error::ExtractError;
use crate::registry::SiteRegistry;

/// Parses site configs from YAML text, sorted by site name.
///
/// `source` names the input in error messages.
pub fn parse_site_configs(yaml: &str, source: &str) -> Result<Vec<SiteConfig>, ExtractError> {
    let sites: BTreeMap<String, SiteConfig> = serde_yaml::from_str(yaml)
        .map_err(|e| ExtractError::config(source, "LoadSiteConfigs", Some(e.into())))?;

    Ok(sites
        .into_iter()
        .map(|(name, mut config)| {
            if config.site_name.is_empty() {
                config.site_name = name;
            }
            config
        })
        .collect())
}

/// Reads and parses a site config file.
pub fn load_site_configs(path: impl AsRef<Path>) -> Result<Vec<SiteConfig>, ExtractError> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let yaml = fs::read_to_string(path)
        .map_err(|e| ExtractError::config(&source, "LoadSiteConfigs", Some(e.into())))?;
    let configs = parse_site_configs(&yaml, &source)?;
    tracing::debug!(path = %source, sites = configs.len(), "loaded site configs");
    Ok(configs)
}

/// Reads a site config file into a registry.
pub fn load_registry(path: impl AsRef<Path>) -> Result<SiteRegistry, ExtractError> {
    let mut registry = SiteRegistry::new();
    for config in load_site_configs(path)? {
        registry.register(config);
    }
    Ok(registry)
}
