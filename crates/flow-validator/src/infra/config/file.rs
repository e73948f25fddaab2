//! The reporting configuration file: which flows each domain/version defines,
//! which of them are optional and which rule set validates its messages.
//!
//! ```toml
//! [domains."ONDC:LOG10".versions."1.2.5"]
//! rules = "logistics"
//! optional-flows = ["RTO_FLOW"]
//!
//! [domains."ONDC:LOG10".versions."1.2.5".flows]
//! STANDARD_FLOW = ["search", "on_search", "init", "on_init"]
//! ```

use {
    super::{Error, Reporting},
    crate::domain::flow::{DomainConfig, OptionalFlows, Sequence},
    serde::Deserialize,
    std::{collections::BTreeMap, path::Path},
    tokio::fs,
};

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    #[serde(default)]
    domains: BTreeMap<String, Domain>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Domain {
    versions: BTreeMap<String, Version>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Version {
    /// Locator of the rule set validating this domain/version.
    rules: String,

    /// Expected action sequence per flow id.
    #[serde(default)]
    flows: BTreeMap<String, Tokens>,

    /// Flows a session may leave untested.
    #[serde(default)]
    optional_flows: Option<Tokens>,
}

/// A list of strings, or anything else. The latter is kept instead of
/// rejecting the file so a single bad entry only disables what depends on it.
#[derive(Deserialize)]
#[serde(untagged)]
enum Tokens {
    List(Vec<String>),
    Malformed(toml::Value),
}

impl From<Tokens> for Sequence {
    fn from(tokens: Tokens) -> Self {
        match tokens {
            Tokens::List(tokens) => Self::Defined(tokens),
            Tokens::Malformed(_) => Self::Malformed,
        }
    }
}

impl From<Option<Tokens>> for OptionalFlows {
    fn from(tokens: Option<Tokens>) -> Self {
        match tokens {
            None => Self::default(),
            Some(Tokens::List(flows)) => Self::Listed(flows.into_iter().collect()),
            Some(Tokens::Malformed(_)) => Self::Malformed,
        }
    }
}

/// Parses the reporting configuration from TOML text.
pub fn parse(data: &str) -> Result<Reporting, Error> {
    let config = toml::de::from_str::<Config>(data)?;
    let domains = config
        .domains
        .into_iter()
        .flat_map(|(domain, config)| {
            config.versions.into_iter().map(move |(version, config)| {
                let config = DomainConfig {
                    rules: config.rules,
                    flows: config
                        .flows
                        .into_iter()
                        .map(|(flow, tokens)| (flow, tokens.into()))
                        .collect(),
                    optional_flows: config.optional_flows.into(),
                };
                ((domain.clone(), version), config)
            })
        })
        .collect();
    Ok(Reporting { domains })
}

pub async fn read(path: &Path) -> Result<Reporting, Error> {
    parse(&fs::read_to_string(path).await?)
}

/// Load the reporting configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> Reporting {
    match read(path).await {
        Ok(config) => config,
        Err(Error::Io(e)) => panic!("I/O error while reading {path:?}: {e:?}"),
        Err(Error::Toml(e)) => panic!("TOML syntax error while reading {path:?}: {e:?}"),
    }
}
