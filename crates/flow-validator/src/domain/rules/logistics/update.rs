use {
    super::{delivery_fulfillments, ready_to_ship_flag, rts_key},
    crate::domain::{
        report::TestResult,
        rules::{Context, Rule, common},
    },
    serde_json::Value,
};

pub struct Update;

#[async_trait::async_trait]
impl Rule for Update {
    fn name(&self) -> &'static str {
        "logistics::update"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        let scope = ctx.scope();

        checks.assert(
            common::not_later(
                common::timestamp_at(order, "/updated_at"),
                ctx.message.context_timestamp(),
            ),
            "order.updated_at timestamp validation passed",
            "order.updated_at timestamp should be less than or equal to context/timestamp",
        );

        let mut instructed = true;
        for fulfillment in delivery_fulfillments(order) {
            let Some(rts) = ready_to_ship_flag(fulfillment) else {
                continue;
            };
            scope
                .save(&rts_key(fulfillment), Value::String(rts.to_owned()))
                .await;
            if rts == "yes" && !common::is_present(&fulfillment["start"]["instructions"]) {
                instructed = false;
            }
        }
        checks.assert(
            instructed,
            "Pickup instructions validation passed",
            "Pickup instructions (fulfillments/start/instructions) should be provided if ready_to_ship = yes",
        );

        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            rules::testing::{Harness, SESSION, TRANSACTION, message},
            state::Scope,
        },
        serde_json::json,
    };

    fn ready(id: &str, rts: &str, start: Value) -> Value {
        json!({
            "id": id,
            "type": "Delivery",
            "start": start,
            "tags": [{ "code": "state", "list": [{ "code": "ready_to_ship", "value": rts }] }]
        })
    }

    #[tokio::test]
    async fn ready_to_ship_needs_instructions() {
        let harness = Harness::default();
        let message = message(
            "update",
            json!({ "domain": "ONDC:LOG11" }),
            json!({ "order": {
                "updated_at": "2024-05-01T10:00:00.000Z",
                "fulfillments": [
                    ready("F1", "no", json!({})),
                    ready("F2", "yes", json!({ "time": {} }))
                ]
            } }),
        );
        let result = harness.run(&Update, "STANDARD_FLOW", &message).await;
        assert_eq!(result.passed, vec!["order.updated_at timestamp validation passed"]);
        assert_eq!(
            result.failed,
            vec!["Pickup instructions (fulfillments/start/instructions) should be provided if ready_to_ship = yes"]
        );

        let scope = Scope::new(&harness.store, SESSION, TRANSACTION);
        assert_eq!(scope.fetch_str("F1:rts").await.as_deref(), Some("no"));
        assert_eq!(scope.fetch_str("F2:rts").await.as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn instructions_satisfy_ready_to_ship() {
        let message = message(
            "update",
            json!({}),
            json!({ "order": {
                "updated_at": "2024-05-01T09:00:00.000Z",
                "fulfillments": [ready("F1", "yes", json!({ "instructions": { "short_desc": "OTP 1234" } }))]
            } }),
        );
        let result = Harness::default().run(&Update, "STANDARD_FLOW", &message).await;
        assert!(result.failed.is_empty(), "{:?}", result.failed);
        assert!(result.passed.contains(&"Pickup instructions validation passed".to_owned()));
    }
}
