//! Helpers for running rules against hand-written payloads.

use {
    super::{Context, Rule, Settings},
    crate::{
        domain::{Action, Message, report::TestResult},
        infra::state::Memory,
    },
    serde_json::{Value, json},
};

pub const SESSION: &str = "session-1";
pub const TRANSACTION: &str = "txn-1";

/// A message for `action` whose request carries the given context fields
/// and `message` body.
pub fn message(action: &str, context: Value, body: Value) -> Message {
    let mut full_context = json!({
        "action": action,
        "transaction_id": TRANSACTION,
        "timestamp": "2024-05-01T10:00:00.000Z",
    });
    if let (Some(full), Value::Object(extra)) = (full_context.as_object_mut(), context) {
        full.extend(extra);
    }
    serde_json::from_value(json!({
        "action": action,
        "transactionId": TRANSACTION,
        "jsonRequest": { "context": full_context, "message": body },
        "createdAt": "2024-05-01T10:00:01Z"
    }))
    .unwrap()
}

/// Runs rules over one state store, the way a flow's messages are
/// validated one after the other.
#[derive(Default)]
pub struct Harness {
    pub store: Memory,
    pub settings: Settings,
}

impl Harness {
    pub async fn run(&self, rule: &dyn Rule, flow: &str, message: &Message) -> TestResult {
        let ctx = Context {
            message,
            action: Action::parse(&message.action).unwrap(),
            session: SESSION,
            flow,
            state: &self.store,
            settings: self.settings,
        };
        rule.check(&ctx).await
    }
}
