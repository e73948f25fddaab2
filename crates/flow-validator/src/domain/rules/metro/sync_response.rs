//! Shape of the synchronous ACK/NACK a counterparty returns for every call.

use {
    crate::domain::{
        message::parse_timestamp,
        report::TestResult,
        rules::{Context, Rule},
    },
    serde_json::Value,
    url::Url,
};

/// Runs the sync response check before the wrapped rule.
pub struct WithSyncResponse<R>(pub R);

#[async_trait::async_trait]
impl<R: Rule> Rule for WithSyncResponse<R> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        if let Some(response) = ctx.message.response() {
            let violations = violations(response);
            if !violations.is_empty() {
                checks.fail(format!("Issue with sync response: {}", violations.join(", ")));
            }
        }
        checks.merge(self.0.check(ctx).await);
        checks.finish()
    }
}

enum Field {
    Text,
    Uri,
    Timestamp,
}

const REQUIRED_CONTEXT: [(&str, Field); 8] = [
    ("domain", Field::Text),
    ("action", Field::Text),
    ("bap_id", Field::Text),
    ("bap_uri", Field::Uri),
    ("transaction_id", Field::Text),
    ("message_id", Field::Text),
    ("timestamp", Field::Timestamp),
    ("version", Field::Text),
];

const OPTIONAL_CONTEXT: [(&str, Field); 3] = [
    ("bpp_id", Field::Text),
    ("bpp_uri", Field::Uri),
    ("ttl", Field::Text),
];

fn field(violations: &mut Vec<String>, path: &str, value: &Value, kind: &Field) {
    let Some(raw) = value.as_str() else {
        violations.push(format!(r#""{path}" must be a string"#));
        return;
    };
    match kind {
        Field::Text => {}
        Field::Uri if Url::parse(raw).is_err() => {
            violations.push(format!(r#""{path}" must be a valid uri"#))
        }
        Field::Timestamp if parse_timestamp(value).is_none() => {
            violations.push(format!(r#""{path}" must be in iso format"#))
        }
        Field::Uri | Field::Timestamp => {}
    }
}

/// Every way `response` deviates from the expected envelope.
pub fn violations(response: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    match &response["context"] {
        Value::Null => violations.push(r#""context" is required"#.to_owned()),
        context @ Value::Object(_) => {
            for (name, kind) in &REQUIRED_CONTEXT {
                let path = format!("context.{name}");
                let value = match (*name, &context[*name]) {
                    ("version", Value::Null) => &context["core_version"],
                    (_, value) => value,
                };
                if value.is_null() {
                    violations.push(format!(r#""{path}" is required"#));
                } else {
                    field(&mut violations, &path, value, kind);
                }
            }
            for (name, kind) in &OPTIONAL_CONTEXT {
                if !context[*name].is_null() {
                    field(&mut violations, &format!("context.{name}"), &context[*name], kind);
                }
            }
        }
        _ => violations.push(r#""context" must be of type object"#.to_owned()),
    }

    let status = &response["message"]["ack"]["status"];
    if response["message"].is_null() {
        violations.push(r#""message" is required"#.to_owned());
    } else if response["message"]["ack"].is_null() {
        violations.push(r#""message.ack" is required"#.to_owned());
    } else if status.is_null() {
        violations.push(r#""message.ack.status" is required"#.to_owned());
    } else if status != "ACK" && status != "NACK" {
        violations.push(r#""message.ack.status" must be one of [ACK, NACK]"#.to_owned());
    }

    let error = &response["error"];
    if status == "NACK" {
        match error {
            Value::Null => violations.push(r#""error" is required"#.to_owned()),
            Value::Object(_) => {
                for name in ["code", "message"] {
                    let path = format!("error.{name}");
                    if error[name].is_null() {
                        violations.push(format!(r#""{path}" is required"#));
                    } else {
                        field(&mut violations, &path, &error[name], &Field::Text);
                    }
                }
            }
            _ => violations.push(r#""error" must be of type object"#.to_owned()),
        }
    } else if !error.is_null() {
        violations.push(r#""error" is not allowed"#.to_owned());
    }

    violations
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn context() -> Value {
        json!({
            "domain": "ONDC:TRV11",
            "action": "on_search",
            "version": "2.0.0",
            "bap_id": "buyer.example",
            "bap_uri": "https://buyer.example/ondc",
            "transaction_id": "t",
            "message_id": "m",
            "timestamp": "2024-05-01T10:00:00.000Z",
            "location": { "city": { "code": "std:011" } }
        })
    }

    #[test]
    fn well_formed_responses() {
        assert!(violations(&json!({
            "context": context(),
            "message": { "ack": { "status": "ACK" } }
        }))
        .is_empty());
        assert!(violations(&json!({
            "context": context(),
            "message": { "ack": { "status": "NACK" } },
            "error": { "code": "30000", "message": "Invalid request" }
        }))
        .is_empty());
    }

    #[test]
    fn lists_every_violation() {
        let mut context = context();
        context["bap_uri"] = json!("not a uri");
        context["timestamp"] = json!("yesterday");
        context.as_object_mut().unwrap().remove("message_id");

        assert_eq!(
            violations(&json!({
                "context": context,
                "message": { "ack": { "status": "NACK" } }
            })),
            vec![
                r#""context.bap_uri" must be a valid uri"#,
                r#""context.message_id" is required"#,
                r#""context.timestamp" must be in iso format"#,
                r#""error" is required"#,
            ]
        );
    }

    #[test]
    fn error_only_with_nack() {
        assert_eq!(
            violations(&json!({
                "context": context(),
                "message": { "ack": { "status": "ACK" } },
                "error": { "code": "30000", "message": "x" }
            })),
            vec![r#""error" is not allowed"#]
        );
        assert_eq!(
            violations(&json!({ "context": context(), "message": { "ack": { "status": "OK" } } })),
            vec![r#""message.ack.status" must be one of [ACK, NACK]"#]
        );
    }
}
