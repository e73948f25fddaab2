use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
    serde_with::{json::JsonString, serde_as},
    std::collections::BTreeMap,
};

/// The outcome of running one rule against one message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// The counterparty's synchronous response, echoed verbatim (`{}` when
    /// there was none).
    pub response: Value,
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

impl Default for TestResult {
    fn default() -> Self {
        Self {
            response: Value::Object(Default::default()),
            passed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Validation outcome of a single flow.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowValidationResult {
    /// Whether the observed actions matched the configured sequence.
    pub valid_flow: bool,
    /// Sequence mismatches.
    pub errors: Vec<String>,
    /// Messages no rule could be run for. These leave `valid_flow` alone.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dispatch_errors: Vec<String>,
    /// Keyed by `<action>_<occurrence>`; each result is embedded as a JSON
    /// string.
    #[serde_as(as = "BTreeMap<_, JsonString>")]
    pub messages: BTreeMap<String, TestResult>,
}

impl Default for FlowValidationResult {
    fn default() -> Self {
        Self {
            valid_flow: true,
            errors: Vec::new(),
            dispatch_errors: Vec::new(),
            messages: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory_flows: Option<String>,
}

/// Result of one validation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub final_report: FinalReport,
    pub flow_errors: BTreeMap<String, FlowValidationResult>,
}

#[cfg(test)]
mod tests {
    use {super::*, maplit::btreemap, serde_json::json};

    #[test]
    fn serializes_messages_as_json_strings() {
        let report = Report {
            final_report: FinalReport {
                mandatory_flows: Some("F3 is/are mandatory and should be tested.".to_owned()),
            },
            flow_errors: btreemap! {
                "F1".to_owned() => FlowValidationResult {
                    valid_flow: true,
                    errors: vec![],
                    dispatch_errors: vec![],
                    messages: btreemap! {
                        "search_1".to_owned() => TestResult {
                            passed: vec!["Validated search".to_owned()],
                            ..Default::default()
                        },
                    },
                },
            },
        };

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "finalReport": { "mandatoryFlows": "F3 is/are mandatory and should be tested." },
                "flowErrors": {
                    "F1": {
                        "valid_flow": true,
                        "errors": [],
                        "messages": {
                            "search_1": r#"{"response":{},"passed":["Validated search"],"failed":[]}"#
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn omits_absent_mandatory_note() {
        assert_eq!(
            serde_json::to_value(Report::default()).unwrap(),
            json!({ "finalReport": {}, "flowErrors": {} })
        );
    }
}
