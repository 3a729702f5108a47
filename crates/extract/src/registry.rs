// ABOUTME: Registry of site configurations indexed by site name and by domain.
// ABOUTME: Domains come from start URL hosts plus each site's additional_domains.

use std::collections::{BTreeMap, HashMap};
use url::Url;

use crate::config::SiteConfig;

/// Site configs for one run, looked up by name or by the domain of a URL.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: BTreeMap<String, SiteConfig>,
    domains: HashMap<String, String>,
}

impl SiteRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a site under its name and every domain it serves.
    pub fn register(&mut self, config: SiteConfig) {
        let name = config.site_name.clone();
        let hosts = config
            .start_url
            .iter()
            .chain(&config.article_list)
            .filter_map(|u| Url::parse(u).ok())
            .filter_map(|u| u.host_str().map(str::to_lowercase));
        for domain in hosts.chain(config.additional_domains.iter().map(|d| d.to_lowercase())) {
            self.domains.insert(domain, name.clone());
        }
        self.sites.insert(name, config);
    }

    /// Looks up a site by name.
    pub fn get(&self, site_name: &str) -> Option<&SiteConfig> {
        self.sites.get(site_name)
    }

    /// Looks up a site by domain, ignoring a leading `www.`.
    pub fn for_domain(&self, domain: &str) -> Option<&SiteConfig> {
        let domain = domain.to_lowercase();
        let bare = domain.strip_prefix("www.").unwrap_or(&domain);
        [domain.as_str(), bare, format!("www.{}", bare).as_str()]
            .iter()
            .find_map(|d| self.domains.get(*d))
            .and_then(|name| self.sites.get(name))
    }

    /// Looks up the site serving `url`.
    pub fn for_url(&self, url: &str) -> Option<&SiteConfig> {
        let parsed = Url::parse(url).ok()?;
        self.for_domain(parsed.host_str()?)
    }

    /// Site names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.values()
    }

    /// Returns the number of registered sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns true if no sites are registered.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl FromIterator<SiteConfig> for SiteRegistry {
    fn from_iter<I: IntoIterator<Item = SiteConfig>>(iter: I) -> Self {
        let mut registry = Self::new();
        for config in iter {
            registry.register(config);
        }
        registry
    }
}
