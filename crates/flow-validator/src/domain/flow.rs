//! Flow definitions and the checks that run against a flow as a whole: the
//! expected action sequence and the set of flows a session must exercise.

use std::collections::{BTreeMap, BTreeSet};

/// The configured sequence of actions of one flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sequence {
    Defined(Vec<String>),
    /// The configuration entry exists but is not a list of action tokens. No
    /// sequence check is performed for such flows.
    Malformed,
}

/// The flows of a domain/version that a session may leave untested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionalFlows {
    Listed(BTreeSet<String>),
    /// The configuration entry is not a list. Every untested flow is then
    /// considered mandatory.
    Malformed,
}

impl Default for OptionalFlows {
    fn default() -> Self {
        Self::Listed(BTreeSet::new())
    }
}

/// Everything the engine needs to know about one domain and protocol version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainConfig {
    /// Locator of the rule set that validates messages of this domain/version.
    pub rules: String,
    pub flows: BTreeMap<String, Sequence>,
    pub optional_flows: OptionalFlows,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Flow and rule configuration for a domain/version, or `None` when
    /// nothing is configured for it.
    async fn flow_config(&self, domain: &str, version: &str) -> Option<DomainConfig>;
}

/// Compares the observed actions of a flow against its expected sequence.
///
/// Only the positions of `expected` are inspected, so trailing actions beyond
/// the configured sequence are accepted. On the first mismatch a single error
/// describing it is returned and later positions are not looked at.
pub fn check_sequence<S: AsRef<str>>(expected: &[String], actual: &[S]) -> Result<(), String> {
    let token = |i: usize| actual.get(i).map(|action| action.as_ref().to_lowercase());

    for (i, expected) in expected.iter().enumerate() {
        let found = token(i);
        if found.as_deref() == Some(expected.to_lowercase().as_str()) {
            continue;
        }

        let expected = match expected.as_str() {
            "select" => "select or init",
            other => other,
        };
        let previous = i
            .checked_sub(1)
            .and_then(token)
            .unwrap_or_else(|| "undefined".to_owned());
        let found = found
            .filter(|found| !found.is_empty())
            .unwrap_or_else(|| "undefined".to_owned());
        return Err(format!(
            "Expected '{expected}' after '{previous}', but found '{found}'."
        ));
    }
    Ok(())
}

/// Configured flows that were neither tested nor marked optional, ordered
/// by flow id.
pub fn mandatory_flows<'a>(
    config: &'a DomainConfig,
    tested: &BTreeSet<&str>,
) -> Vec<&'a str> {
    config
        .flows
        .keys()
        .map(String::as_str)
        .filter(|flow| !tested.contains(flow))
        .filter(|flow| match &config.optional_flows {
            OptionalFlows::Listed(optional) => !optional.contains(*flow),
            OptionalFlows::Malformed => true,
        })
        .collect()
}

/// The run-level note listing missing mandatory flows.
pub fn mandatory_note(missing: &[&str]) -> Option<String> {
    (!missing.is_empty()).then(|| {
        format!(
            "{} is/are mandatory and should be tested.",
            missing.join(",")
        )
    })
}
