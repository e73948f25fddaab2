use {
    crate::{
        domain::{
            Action,
            Message,
            dispatch::{self, Dispatcher},
            flow::{self, ConfigProvider, DomainConfig, Sequence},
            report::{FinalReport, FlowValidationResult, Report},
            session::SessionDirectory,
        },
        infra::observe,
    },
    std::{
        collections::{BTreeSet, HashMap},
        sync::Arc,
    },
};

/// Validates every flow of a session and assembles the report.
pub struct Orchestrator {
    config: Arc<dyn ConfigProvider>,
    sessions: Arc<dyn SessionDirectory>,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        sessions: Arc<dyn SessionDirectory>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            config,
            sessions,
            dispatcher,
        }
    }

    /// Validates the captured messages of each flow of `session`.
    ///
    /// Never fails: defects of a single message or flow are recorded in that
    /// flow's entry of the report. Flows are validated concurrently, the
    /// messages of one flow strictly one after the other.
    pub async fn validate(&self, flows: HashMap<String, Vec<Message>>, session: &str) -> Report {
        observe::validating(session, flows.len());
        let config = self.domain_config(session).await;

        let mut report = Report::default();
        if let Some(config) = &config {
            let tested = flows.keys().map(String::as_str).collect::<BTreeSet<_>>();
            let missing = flow::mandatory_flows(config, &tested);
            if !missing.is_empty() {
                observe::mandatory_flows_missing(session, &missing);
            }
            report.final_report = FinalReport {
                mandatory_flows: flow::mandatory_note(&missing),
            };
        }

        let results = futures::future::join_all(flows.into_iter().map(|(flow, messages)| {
            let config = config.as_ref();
            async move {
                let result = self.validate_flow(&flow, messages, config, session).await;
                (flow, result)
            }
        }))
        .await;
        report.flow_errors = results.into_iter().collect();

        observe::validated(session, &report);
        report
    }

    async fn domain_config(&self, session: &str) -> Option<DomainConfig> {
        let details = match self.sessions.details(session).await {
            Ok(details) => details,
            Err(err) => {
                observe::session_unresolved(session, &err);
                return None;
            }
        };
        let config = self
            .config
            .flow_config(&details.domain, &details.version)
            .await;
        if config.is_none() {
            observe::missing_config(&details.domain, &details.version);
        }
        config
    }

    async fn validate_flow(
        &self,
        flow: &str,
        mut messages: Vec<Message>,
        config: Option<&DomainConfig>,
        session: &str,
    ) -> FlowValidationResult {
        messages.sort_by_key(|message| message.created_at);
        let mut result = FlowValidationResult::default();

        match config.and_then(|config| config.flows.get(flow)) {
            Some(Sequence::Defined(expected)) => {
                let actual = messages
                    .iter()
                    .map(|message| message.action.as_str())
                    .collect::<Vec<_>>();
                if let Err(error) = flow::check_sequence(expected, &actual) {
                    observe::sequence_mismatch(flow, &error);
                    result.valid_flow = false;
                    result.errors.push(error);
                }
            }
            Some(Sequence::Malformed) => observe::malformed_sequence(flow),
            None => observe::unconfigured_flow(flow),
        }

        let mut occurrences = HashMap::<Action, usize>::new();
        for (index, message) in messages.iter().enumerate() {
            let Some(action) = Action::parse(&message.action) else {
                observe::unknown_action(flow, index, &message.action);
                continue;
            };

            let outcome = match config {
                Some(config) => {
                    self.dispatcher
                        .dispatch(
                            message.domain(),
                            message,
                            action,
                            session,
                            flow,
                            &config.rules,
                        )
                        .await
                }
                None => Err(dispatch::Error::Unconfigured),
            };

            match outcome {
                Ok(test) => {
                    let occurrence = occurrences.entry(action).or_insert(1);
                    result.messages.insert(format!("{action}_{occurrence}"), test);
                    *occurrence += 1;
                }
                Err(err) => {
                    observe::dispatch_failed(flow, action, index, &err);
                    result
                        .dispatch_errors
                        .push(format!("Dispatch error for {action} at index {index}: {err}"));
                }
            }
        }

        result
    }
}
