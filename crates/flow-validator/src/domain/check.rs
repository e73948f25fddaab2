use {
    crate::domain::{Action, Message, report::TestResult},
    serde_json::Value,
};

/// Accumulates the outcome of the independent checks a rule runs.
///
/// A failing check never stops the rule; its description is recorded and the
/// next check runs.
#[derive(Debug)]
pub struct Checks {
    action: Action,
    result: TestResult,
}

impl Checks {
    pub fn new(message: &Message, action: Action) -> Self {
        Self {
            action,
            result: TestResult {
                response: message
                    .response()
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default())),
                ..Default::default()
            },
        }
    }

    /// Records `passed` when `ok` holds and `failed` otherwise.
    pub fn assert(&mut self, ok: bool, passed: impl Into<String>, failed: impl Into<String>) {
        if ok {
            self.pass(passed);
        } else {
            self.fail(failed);
        }
    }

    pub fn pass(&mut self, description: impl Into<String>) {
        self.result.passed.push(description.into());
    }

    pub fn fail(&mut self, description: impl Into<String>) {
        let description = description.into();
        tracing::debug!(action = %self.action, %description, "check failed");
        self.result.failed.push(description);
    }

    /// Appends the checks of another result, keeping this result's response.
    pub fn merge(&mut self, other: TestResult) {
        self.result.passed.extend(other.passed);
        for failure in other.failed {
            self.fail(failure);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.result.passed.is_empty() && self.result.failed.is_empty()
    }

    /// Completes the result. An action for which no check ran is reported as
    /// validated so that it never disappears from the report.
    pub fn finish(mut self) -> TestResult {
        if self.is_empty() {
            self.result.passed.push(format!("Validated {}", self.action));
        }
        self.result
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn message(response: Option<Value>) -> Message {
        serde_json::from_value(json!({
            "action": "search",
            "jsonRequest": {},
            "jsonResponse": response.map(|response| json!({ "response": response })),
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn empty_rule_is_reported_as_validated() {
        let result = Checks::new(&message(None), Action::Status).finish();
        assert_eq!(result.passed, vec!["Validated status"]);
        assert!(result.failed.is_empty());
        assert_eq!(result.response, json!({}));
    }

    #[test]
    fn failures_do_not_stop_later_checks() {
        let mut checks = Checks::new(&message(None), Action::Search);
        checks.assert(false, "first passed", "first failed");
        checks.assert(true, "second passed", "second failed");
        let result = checks.finish();
        assert_eq!(result.passed, vec!["second passed"]);
        assert_eq!(result.failed, vec!["first failed"]);
    }

    #[test]
    fn echoes_response() {
        let ack = json!({ "message": { "ack": { "status": "NACK" } } });
        let result = Checks::new(&message(Some(ack.clone())), Action::Search).finish();
        assert_eq!(result.response, ack);
    }

    #[test]
    fn merge_appends_both_lists() {
        let mut checks = Checks::new(&message(None), Action::Confirm);
        checks.pass("own");
        checks.merge(TestResult {
            passed: vec!["common".to_owned()],
            failed: vec!["common failure".to_owned()],
            ..Default::default()
        });
        let result = checks.finish();
        assert_eq!(result.passed, vec!["own", "common"]);
        assert_eq!(result.failed, vec!["common failure"]);
    }
}
