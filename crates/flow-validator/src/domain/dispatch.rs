use {
    crate::domain::{
        Action,
        Message,
        report::TestResult,
        rules::{Context, Registry, Settings},
        state::StateStore,
    },
    futures::FutureExt,
    std::{panic::AssertUnwindSafe, sync::Arc},
    tracing::Instrument,
};

/// Why a message could not be validated. These are configuration defects, as
/// opposed to failed checks which are reported inside a [`TestResult`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no flow configuration for the session's domain and version")]
    Unconfigured,
    #[error("no rule set registered under {0:?}")]
    UnknownRuleSet(String),
    #[error("rule set {locator:?} has no rule for {action}")]
    NoRule { locator: String, action: Action },
    #[error("rule {rule} panicked")]
    Panicked { rule: &'static str },
}

/// Routes messages to the rule registered for their action.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    state: Arc<dyn StateStore>,
    settings: Settings,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, state: Arc<dyn StateStore>, settings: Settings) -> Self {
        Self {
            registry,
            state,
            settings,
        }
    }

    /// Runs the rule that `locator` registers for `action` against `message`.
    ///
    /// A panicking rule is contained and reported as an error so that it
    /// cannot take down the rest of the run.
    pub async fn dispatch(
        &self,
        domain: Option<&str>,
        message: &Message,
        action: Action,
        session: &str,
        flow: &str,
        locator: &str,
    ) -> Result<TestResult, Error> {
        let set = self
            .registry
            .set(locator)
            .ok_or_else(|| Error::UnknownRuleSet(locator.to_owned()))?;
        let rule = set.get(action).ok_or_else(|| Error::NoRule {
            locator: locator.to_owned(),
            action,
        })?;

        let ctx = Context {
            message,
            action,
            session,
            flow,
            state: self.state.as_ref(),
            settings: self.settings,
        };
        let span = tracing::debug_span!(
            "rule",
            rule = rule.name(),
            domain = domain.unwrap_or_default(),
            %action,
            transaction = message.transaction(),
        );
        AssertUnwindSafe(rule.check(&ctx))
            .catch_unwind()
            .instrument(span)
            .await
            .map_err(|_| Error::Panicked { rule: rule.name() })
    }
}
