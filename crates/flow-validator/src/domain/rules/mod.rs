//! Per-domain rule catalogs and the static registry that resolves a rule set
//! locator and an action to the rule validating it.

use {
    crate::domain::{
        Action,
        Message,
        check::Checks,
        flow::{DomainConfig, Sequence},
        report::TestResult,
        state::{Scope, StateStore},
    },
    std::{collections::HashMap, sync::Arc},
    strum::IntoEnumIterator,
};

pub mod common;
pub mod legacy;
pub mod logistics;
pub mod metro;
#[cfg(test)]
pub(crate) mod testing;

/// How the "pickup range required when ready to ship" check combines the
/// fulfillments that were flagged ready to ship.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ReadyToShipPolicy {
    /// Every flagged fulfillment must carry a pickup time range.
    #[default]
    Every,
    /// At least one flagged fulfillment must carry a pickup time range.
    Any,
}

/// Engine-wide knobs rules consult.
#[derive(Clone, Copy, Debug, Default)]
pub struct Settings {
    pub ready_to_ship: ReadyToShipPolicy,
}

/// Everything a rule may look at while validating one message.
pub struct Context<'a> {
    pub message: &'a Message,
    pub action: Action,
    pub session: &'a str,
    pub flow: &'a str,
    pub state: &'a dyn StateStore,
    pub settings: Settings,
}

impl<'a> Context<'a> {
    /// State scoped to this message's transaction.
    pub fn scope(&self) -> Scope<'a> {
        Scope::new(self.state, self.session, self.message.transaction())
    }

    pub fn checks(&self) -> Checks {
        Checks::new(self.message, self.action)
    }
}

/// A rule validates one message. Failed checks are reported in the returned
/// result; a rule never fails as a whole.
#[async_trait::async_trait]
pub trait Rule: Send + Sync {
    /// Human-readable name of this rule (for logging/debugging).
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &Context<'_>) -> TestResult;
}

/// A rule that runs no checks; the action is reported as validated.
pub struct NoChecks;

#[async_trait::async_trait]
impl Rule for NoChecks {
    fn name(&self) -> &'static str {
        "no-checks"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        ctx.checks().finish()
    }
}

/// The rules of one domain family, keyed by action.
#[derive(Clone)]
pub struct RuleSet {
    rules: HashMap<Action, Arc<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with(mut self, action: Action, rule: impl Rule + 'static) -> Self {
        self.rules.insert(action, Arc::new(rule));
        self
    }

    /// Registers [`NoChecks`] for every action that has no rule yet.
    pub fn rest_unchecked(mut self) -> Self {
        for action in Action::iter() {
            self.rules
                .entry(action)
                .or_insert_with(|| Arc::new(NoChecks));
        }
        self
    }

    pub fn get(&self, action: Action) -> Option<&Arc<dyn Rule>> {
        self.rules.get(&action)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{config}: unknown rule set {locator:?}")]
    UnknownRuleSet { config: String, locator: String },
    #[error("{config}: flow {flow} expects {token:?}, which is not a protocol action")]
    UnknownAction {
        config: String,
        flow: String,
        token: String,
    },
    #[error("{config}: flow {flow} expects {action}, which rule set {locator} does not cover")]
    UncoveredAction {
        config: String,
        flow: String,
        action: Action,
        locator: String,
    },
}

/// Maps rule set locators to rule sets.
#[derive(Clone, Default)]
pub struct Registry {
    sets: HashMap<String, RuleSet>,
}

impl Registry {
    /// The rule sets shipped with the validator.
    pub fn standard() -> Self {
        Self::default()
            .with(logistics::LOCATOR, logistics::rules())
            .with(legacy::LOCATOR, legacy::rules())
            .with(metro::LOCATOR, metro::rules())
    }

    pub fn with(mut self, locator: &str, set: RuleSet) -> Self {
        self.sets.insert(locator.to_owned(), set);
        self
    }

    pub fn set(&self, locator: &str) -> Option<&RuleSet> {
        self.sets.get(locator)
    }

    /// Checks at startup that every configured locator resolves and every
    /// action named by a configured flow has a rule. `configs` yields a label
    /// for error messages with each configuration.
    pub fn verify<'a>(
        &self,
        configs: impl IntoIterator<Item = (String, &'a DomainConfig)>,
    ) -> Result<(), Error> {
        for (label, config) in configs {
            let Some(set) = self.set(&config.rules) else {
                return Err(Error::UnknownRuleSet {
                    config: label,
                    locator: config.rules.clone(),
                });
            };
            for (flow, sequence) in &config.flows {
                let Sequence::Defined(tokens) = sequence else {
                    continue;
                };
                for token in tokens {
                    let Some(action) = Action::parse(token) else {
                        return Err(Error::UnknownAction {
                            config: label,
                            flow: flow.clone(),
                            token: token.clone(),
                        });
                    };
                    if set.get(action).is_none() {
                        return Err(Error::UncoveredAction {
                            config: label,
                            flow: flow.clone(),
                            action,
                            locator: config.rules.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
