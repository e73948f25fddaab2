use {
    crate::domain::flow::{ConfigProvider, DomainConfig},
    std::collections::BTreeMap,
};

pub mod file;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The reporting configuration, loaded once and served from memory.
#[derive(Clone, Debug, Default)]
pub struct Reporting {
    /// Keyed by domain and protocol version.
    domains: BTreeMap<(String, String), DomainConfig>,
}

impl Reporting {
    /// Every configured domain/version, labelled `<domain>/<version>`.
    pub fn domains(&self) -> impl Iterator<Item = (String, &DomainConfig)> {
        self.domains
            .iter()
            .map(|((domain, version), config)| (format!("{domain}/{version}"), config))
    }
}

#[async_trait::async_trait]
impl ConfigProvider for Reporting {
    async fn flow_config(&self, domain: &str, version: &str) -> Option<DomainConfig> {
        self.domains
            .get(&(domain.to_owned(), version.to_owned()))
            .cloned()
    }
}
