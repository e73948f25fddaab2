//! End-to-end validation runs over hand-written sessions.

use {
    crate::{
        domain::{
            Orchestrator,
            dispatch::Dispatcher,
            report::TestResult,
            rules::{Registry, Settings},
            session::{Fixed, SessionDetails},
        },
        infra::{config, observe, state::Memory},
    },
    serde_json::{Value, json},
    std::sync::Arc,
};

mod flows;

pub const SESSION: &str = "session-1";

/// A validator configured from TOML text, for a session of the given domain
/// and version. Every engine has its own state store.
pub struct Engine {
    orchestrator: Orchestrator,
}

impl Engine {
    pub fn new(config: &str, domain: &str, version: &str) -> Self {
        observe::tracing::initialize_reentrant("flow_validator=debug");
        let reporting = config::file::parse(config).unwrap();
        let registry = Registry::standard();
        registry.verify(reporting.domains()).unwrap();

        Self {
            orchestrator: Orchestrator::new(
                Arc::new(reporting),
                Arc::new(Fixed(SessionDetails {
                    domain: domain.to_owned(),
                    version: version.to_owned(),
                })),
                Dispatcher::new(
                    Arc::new(registry),
                    Arc::new(Memory::default()),
                    Settings::default(),
                ),
            ),
        }
    }

    /// Validates `flows`, a JSON object of flow ids to message lists, and
    /// returns the serialized report.
    pub async fn validate(&self, flows: Value) -> Value {
        let flows = serde_json::from_value(flows).unwrap();
        let report = self.orchestrator.validate(flows, SESSION).await;
        serde_json::to_value(&report).unwrap()
    }
}

/// A captured message. `second` orders messages within a flow; the request
/// timestamp is one second before the message was captured.
pub fn message(action: &str, transaction: &str, second: u32, context: Value, body: Value) -> Value {
    let mut full_context = json!({
        "action": action,
        "transaction_id": transaction,
        "timestamp": format!("2024-05-01T10:00:{:02}.000Z", second.saturating_sub(1)),
    });
    if let (Some(full), Value::Object(extra)) = (full_context.as_object_mut(), context) {
        full.extend(extra);
    }
    json!({
        "action": action,
        "transactionId": transaction,
        "jsonRequest": { "context": full_context, "message": body },
        "createdAt": format!("2024-05-01T10:00:{second:02}Z"),
    })
}

/// The result of the `key` message (e.g. `search_1`) of `flow`.
pub fn result(report: &Value, flow: &str, key: &str) -> TestResult {
    let embedded = report["flowErrors"][flow]["messages"][key]
        .as_str()
        .unwrap_or_else(|| panic!("no result for {flow}/{key} in {report:#}"));
    serde_json::from_str(embedded).unwrap()
}
