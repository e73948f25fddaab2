use {
    super::{delivery_fulfillments, ready_to_ship_flag, rts_key},
    crate::domain::{
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, array, flows},
        },
    },
    serde_json::Value,
};

/// Records the order creation time and the ready-to-ship flags that the
/// seller app's callbacks are later checked against.
pub struct Confirm;

#[async_trait::async_trait]
impl Rule for Confirm {
    fn name(&self) -> &'static str {
        "logistics::confirm"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        let scope = ctx.scope();
        let context = ctx.message.context_timestamp();

        scope.save("createdAt", order["created_at"].clone()).await;
        checks.assert(
            common::not_later(common::timestamp_at(order, "/created_at"), context),
            "order.created_at timestamp validation passed",
            "order.created_at timestamp cannot be future dated w.r.t context/timestamp",
        );
        checks.assert(
            common::not_later(common::timestamp_at(order, "/updated_at"), context),
            "order.updated_at timestamp validation passed",
            "order.updated_at cannot be future dated w.r.t context/timestamp",
        );

        for fulfillment in delivery_fulfillments(order) {
            if let Some(rts) = ready_to_ship_flag(fulfillment) {
                scope
                    .save(&rts_key(fulfillment), Value::String(rts.to_owned()))
                    .await;
            }
        }

        if ctx.flow == flows::CASH_ON_DELIVERY {
            checks.assert(
                array(&order["fulfillments"]).iter().all(|fulfillment| {
                    common::tag(&fulfillment["tags"], "cod_settlement_detail").is_some()
                }),
                r#"fulfillments have the "cod_settlement_detail" tag"#,
                r#"message.order.fulfillments must have a tag with code "cod_settlement_detail""#,
            );
        }

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

    #[tokio::test]
    async fn records_creation_time_and_ready_to_ship_flags() {
        let harness = Harness::default();
        let message = message(
            "confirm",
            json!({ "domain": "ONDC:LOG10" }),
            json!({ "order": {
                "created_at": "2024-05-01T09:59:00.000Z",
                "updated_at": "2024-05-01T10:00:30.000Z",
                "fulfillments": [
                    { "id": "F1", "type": "Delivery", "tags": [
                        { "code": "state", "list": [{ "code": "ready_to_ship", "value": "yes" }] }
                    ] },
                    { "id": "F2", "type": "RTO", "tags": [
                        { "code": "state", "list": [{ "code": "ready_to_ship", "value": "yes" }] }
                    ] }
                ]
            } }),
        );
        let result = harness.run(&Confirm, flows::CASH_ON_DELIVERY, &message).await;

        assert_eq!(result.passed, vec!["order.created_at timestamp validation passed"]);
        assert_eq!(
            result.failed,
            vec![
                "order.updated_at cannot be future dated w.r.t context/timestamp",
                r#"message.order.fulfillments must have a tag with code "cod_settlement_detail""#,
            ]
        );

        let scope = Scope::new(&harness.store, SESSION, TRANSACTION);
        assert_eq!(
            scope.fetch_str("createdAt").await.as_deref(),
            Some("2024-05-01T09:59:00.000Z")
        );
        assert_eq!(scope.fetch_str("F1:rts").await.as_deref(), Some("yes"));
        assert_eq!(scope.fetch("F2:rts").await, None);
    }
}
