//! Flow level checks: sequences, mandatory flows and message bookkeeping.

use {
    crate::tests::{self, Engine},
    serde_json::json,
};

const CONFIG: &str = r#"
    [domains."ONDC:LOG10".versions."1.2.5"]
    rules = "logistics"
    optional-flows = ["F2"]

    [domains."ONDC:LOG10".versions."1.2.5".flows]
    F1 = ["search", "on_search", "init"]
    F2 = ["search"]
    F3 = ["search", "on_search"]
    F4 = { search = 1 }
"#;

fn message(action: &str, second: u32) -> serde_json::Value {
    tests::message(action, "t-1", second, json!({ "domain": "ONDC:LOG10" }), json!({}))
}

#[tokio::test]
async fn sequence_mismatch_and_mandatory_flows() {
    let engine = Engine::new(CONFIG, "ONDC:LOG10", "1.2.5");
    let report = engine
        .validate(json!({
            "F1": [message("search", 1), message("on_search", 2), message("confirm", 3)],
        }))
        .await;

    assert_eq!(
        report["finalReport"]["mandatoryFlows"],
        "F3,F4 is/are mandatory and should be tested."
    );
    let flow = &report["flowErrors"]["F1"];
    assert_eq!(flow["valid_flow"], false);
    assert_eq!(
        flow["errors"],
        json!(["Expected 'init' after 'on_search', but found 'confirm'."])
    );
    // Messages are validated regardless of the sequence.
    assert_eq!(
        flow["messages"].as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["confirm_1", "on_search_1", "search_1"]
    );
}

#[tokio::test]
async fn messages_are_ordered_by_capture_time() {
    let engine = Engine::new(CONFIG, "ONDC:LOG10", "1.2.5");
    let report = engine
        .validate(json!({
            "F3": [message("on_search", 2), message("search", 1)],
        }))
        .await;

    let flow = &report["flowErrors"]["F3"];
    assert_eq!(flow["valid_flow"], true);
    assert_eq!(flow["errors"], json!([]));
}

#[tokio::test]
async fn repeated_actions_are_numbered() {
    let engine = Engine::new(CONFIG, "ONDC:LOG10", "1.2.5");
    let report = engine
        .validate(json!({
            "F2": [
                message("search", 1),
                message("search", 2),
                message("on_issue", 3),
                message("status", 4),
            ],
        }))
        .await;

    let messages = report["flowErrors"]["F2"]["messages"].as_object().unwrap();
    assert_eq!(
        messages.keys().collect::<Vec<_>>(),
        vec!["search_1", "search_2", "status_1"]
    );
    assert_eq!(
        tests::result(&report, "F2", "status_1").passed,
        vec!["Validated status"]
    );
}

#[tokio::test]
async fn malformed_sequence_skips_the_sequence_check() {
    let engine = Engine::new(CONFIG, "ONDC:LOG10", "1.2.5");
    let report = engine
        .validate(json!({ "F4": [message("on_search", 1)] }))
        .await;

    assert_eq!(report["flowErrors"]["F4"]["valid_flow"], true);
    assert_eq!(report["flowErrors"]["F4"]["errors"], json!([]));
    assert!(report["flowErrors"]["F4"]["messages"]["on_search_1"].is_string());
}

#[tokio::test]
async fn validation_is_repeatable_on_fresh_state() {
    let flows = json!({
        "F1": [message("search", 1), message("on_search", 2), message("init", 3)],
        "F3": [message("search", 4)],
    });

    let first = Engine::new(CONFIG, "ONDC:LOG10", "1.2.5")
        .validate(flows.clone())
        .await;
    let second = Engine::new(CONFIG, "ONDC:LOG10", "1.2.5")
        .validate(flows)
        .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn unconfigured_version_reports_every_message() {
    let engine = Engine::new(CONFIG, "ONDC:LOG10", "9.9.9");
    let report = engine
        .validate(json!({ "F1": [message("search", 1), message("on_search", 2)] }))
        .await;

    assert_eq!(report["finalReport"], json!({}));
    let flow = &report["flowErrors"]["F1"];
    assert_eq!(flow["valid_flow"], true);
    assert_eq!(flow["errors"], json!([]));
    assert_eq!(
        flow["dispatch_errors"],
        json!([
            "Dispatch error for search at index 0: no flow configuration for the session's domain and version",
            "Dispatch error for on_search at index 1: no flow configuration for the session's domain and version",
        ])
    );
    assert_eq!(flow["messages"], json!({}));
}
