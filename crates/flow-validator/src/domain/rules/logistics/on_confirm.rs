use {
    super::{delivery_fulfillments, pickup_ranges_provided},
    crate::domain::{
        report::TestResult,
        rules::{Context, Rule, common},
    },
};

pub struct OnConfirm;

#[async_trait::async_trait]
impl Rule for OnConfirm {
    fn name(&self) -> &'static str {
        "logistics::on_confirm"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        let context = ctx.message.context_timestamp();
        let created_at = common::timestamp_at(order, "/created_at");
        let updated_at = common::timestamp_at(order, "/updated_at");

        checks.assert(
            common::not_later(created_at, context),
            "order.created_at timestamp validation passed",
            "order.created_at timestamp cannot be future dated w.r.t context/timestamp",
        );
        checks.assert(
            common::not_later(updated_at, context),
            "order.updated_at timestamp validation passed",
            "order.updated_at timestamp cannot be future dated w.r.t context/timestamp",
        );
        checks.assert(
            matches!((created_at, updated_at), (Some(created), Some(updated)) if created < updated),
            "order.created_at is future dated w.r.t order.updated_at",
            "order/created_at` cannot be future dated w.r.t `order/updated_at",
        );

        let confirmed = ctx.scope().fetch("createdAt").await;
        checks.assert(
            confirmed.as_ref() != Some(&order["updated_at"]),
            "order.updated_at is updated correctly",
            "order/updated_at` should be updated w.r.t context/timestamp",
        );

        checks.assert(
            delivery_fulfillments(order)
                .all(|fulfillment| !common::is_present(&fulfillment["start"]["time"]["timestamp"])),
            "Timestamp check in fulfillments/start/time passed",
            "Pickup timestamp (fulfillments/start/time/timestamp cannot be provided before order is picked up",
        );
        checks.assert(
            delivery_fulfillments(order)
                .all(|fulfillment| !common::is_present(&fulfillment["end"]["time"]["timestamp"])),
            "Timestamp (not required) check in fulfillments/end/time passed",
            "Delivery timestamp (fulfillments/end/time/timestamp cannot be provided before order is picked up",
        );
        checks.assert(
            pickup_ranges_provided(ctx, delivery_fulfillments(order)).await,
            "Pickup time range (not required) validation passed",
            "Pickup time range (fulfillments/start/time/range) should be provided if ready_to_ship = yes in /confirm",
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
        serde_json::{Value, json},
    };

    fn on_confirm(updated_at: &str, fulfillments: Value) -> crate::domain::Message {
        message(
            "on_confirm",
            json!({ "domain": "ONDC:LOG10" }),
            json!({ "order": {
                "created_at": "2024-05-01T09:00:00.000Z",
                "updated_at": updated_at,
                "fulfillments": fulfillments
            } }),
        )
    }

    #[tokio::test]
    async fn updated_at_must_move_past_confirm() {
        let harness = Harness::default();
        Scope::new(&harness.store, SESSION, TRANSACTION)
            .save("createdAt", json!("2024-05-01T09:30:00.000Z"))
            .await;

        let unchanged = on_confirm("2024-05-01T09:30:00.000Z", json!([]));
        let result = harness.run(&OnConfirm, "STANDARD_FLOW", &unchanged).await;
        assert_eq!(result.failed, vec!["order/updated_at` should be updated w.r.t context/timestamp"]);

        let moved = on_confirm("2024-05-01T09:45:00.000Z", json!([]));
        let result = harness.run(&OnConfirm, "STANDARD_FLOW", &moved).await;
        assert!(result.failed.is_empty(), "{:?}", result.failed);
        assert!(result.passed.contains(&"order.updated_at is updated correctly".to_owned()));
    }

    #[tokio::test]
    async fn delivery_timestamps_and_pickup_range() {
        let harness = Harness::default();
        Scope::new(&harness.store, SESSION, TRANSACTION)
            .save("F1:rts", json!("yes"))
            .await;

        let message = on_confirm(
            "2024-05-01T09:45:00.000Z",
            json!([
                { "id": "F1", "type": "Delivery", "start": { "time": { "timestamp": "2024-05-01T09:50:00.000Z" } } },
                { "id": "F2", "type": "RTO", "end": { "time": { "timestamp": "2024-05-01T09:50:00.000Z" } } }
            ]),
        );
        let result = harness.run(&OnConfirm, "STANDARD_FLOW", &message).await;
        assert_eq!(
            result.failed,
            vec![
                "Pickup timestamp (fulfillments/start/time/timestamp cannot be provided before order is picked up",
                "Pickup time range (fulfillments/start/time/range) should be provided if ready_to_ship = yes in /confirm",
            ]
        );
    }
}
