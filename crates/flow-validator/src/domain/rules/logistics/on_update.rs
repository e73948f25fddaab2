use {
    super::{LOG11, Profile, pickup_ranges_provided, shipment_type, state_code},
    crate::domain::{
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, array, flows},
        },
    },
};

const AWB_NO: &str = "@ondc/org/awb_no";
const PRE_PICKUP_STATES: [&str; 3] = ["Pending", "Agent-assigned", "Searching-for-agent"];

pub struct OnUpdate(pub Profile);

impl OnUpdate {
    /// Whether the shipment is routed hub to hub, which requires an airway
    /// bill and a shipping label.
    fn hub_to_hub(&self, ctx: &Context<'_>) -> bool {
        match self.0 {
            Profile::Current => ctx.message.domain() == Some(LOG11),
            Profile::Legacy => shipment_type(&ctx.message.body()["order"]) == Some("P2H2P"),
        }
    }
}

#[async_trait::async_trait]
impl Rule for OnUpdate {
    fn name(&self) -> &'static str {
        match self.0 {
            Profile::Current => "logistics::on_update",
            Profile::Legacy => "logistics-legacy::on_update",
        }
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        let fulfillments = array(&order["fulfillments"]);

        if self.hub_to_hub(ctx) {
            checks.assert(
                fulfillments
                    .iter()
                    .all(|fulfillment| common::is_present(&fulfillment[AWB_NO])),
                "AWB number for P2H2P validation passed",
                "AWB no is required for P2H2P shipments",
            );
            checks.assert(
                !fulfillments.is_empty()
                    && fulfillments.iter().all(|fulfillment| {
                        common::tag(&fulfillment["tags"], "shipping_label").is_some()
                    }),
                "Shipping label for P2H2P validation passed",
                "Shipping label is required for P2H2P shipments",
            );
        }

        checks.assert(
            pickup_ranges_provided(ctx, fulfillments).await,
            "Pickup time range validation passed",
            "Pickup time range (fulfillments/start/time/range) to be provided if ready_to_ship = yes in /update",
        );

        checks.assert(
            !fulfillments.iter().any(|fulfillment| {
                state_code(fulfillment).is_some_and(|state| PRE_PICKUP_STATES.contains(&state))
                    && (common::is_present(&fulfillment["start"]["time"]["timestamp"])
                        || common::is_present(&fulfillment["end"]["time"]["timestamp"]))
            }),
            "Pickup/Delivery timestamp validation passed",
            "Pickup timestamp (fulfillments/start/time/timestamp) or Delivery timestamp (fulfillments/end/time/timestamp) cannot be provided as the order has not been picked up",
        );

        if self.0 == Profile::Current && ctx.flow == flows::WEIGHT_DIFFERENTIAL {
            let mut differential = false;
            for fulfillment in fulfillments {
                let tags = &fulfillment["tags"];
                let diff = common::tag(tags, "linked_order_diff").is_some();
                let proof = common::tag(tags, "linked_order_diff_proof").is_some();
                differential |= diff;
                if state_code(fulfillment) != Some("Agent-assigned") {
                    checks.assert(
                        diff && proof,
                        "diff tags validation passed",
                        "'linked_order_diff' and 'linked_order_diff_proof' tags are missing in fulfillment.tags",
                    );
                }
            }
            if differential {
                let breakup = array(&order["quote"]["breakup"]);
                let titled =
                    |title: &str| breakup.iter().any(|line| line["@ondc/org/title_type"] == title);
                checks.assert(
                    titled("diff") && titled("tax_diff"),
                    "diff items in quote breakup validation passed",
                    "'diff' and 'tax_diff' titles are missing in quote.breakup",
                );
            }
        }

        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            Message,
            rules::testing::{Harness, SESSION, TRANSACTION, message},
            state::Scope,
        },
        serde_json::{Value, json},
    };

    fn on_update(domain: &str, order: Value) -> Message {
        message("on_update", json!({ "domain": domain }), json!({ "order": order }))
    }

    #[tokio::test]
    async fn hub_to_hub_shipments_need_awb_and_label() {
        let order = json!({
            "items": [{ "descriptor": { "code": "P2H2P" } }],
            "fulfillments": [{
                "id": "F1",
                "@ondc/org/awb_no": "AWB-1",
                "state": { "descriptor": { "code": "Order-picked-up" } },
                "start": { "time": { "timestamp": "2024-05-01T09:00:00.000Z" } }
            }]
        });

        let result = Harness::default()
            .run(&OnUpdate(Profile::Current), "STANDARD_FLOW", &on_update("ONDC:LOG11", order.clone()))
            .await;
        assert_eq!(result.failed, vec!["Shipping label is required for P2H2P shipments"]);
        assert!(result.passed.contains(&"AWB number for P2H2P validation passed".to_owned()));

        let result = Harness::default()
            .run(&OnUpdate(Profile::Current), "STANDARD_FLOW", &on_update("ONDC:LOG10", order.clone()))
            .await;
        assert!(result.failed.is_empty());

        let result = Harness::default()
            .run(&OnUpdate(Profile::Legacy), "STANDARD_FLOW", &on_update("nic2004:60232", order))
            .await;
        assert_eq!(result.failed, vec!["Shipping label is required for P2H2P shipments"]);
    }

    #[tokio::test]
    async fn no_timestamps_before_pickup() {
        let order = json!({ "fulfillments": [{
            "id": "F1",
            "state": { "descriptor": { "code": "Agent-assigned" } },
            "end": { "time": { "timestamp": "2024-05-01T09:00:00.000Z" } }
        }] });
        let result = Harness::default()
            .run(&OnUpdate(Profile::Current), "STANDARD_FLOW", &on_update("ONDC:LOG10", order))
            .await;
        assert_eq!(
            result.failed,
            vec!["Pickup timestamp (fulfillments/start/time/timestamp) or Delivery timestamp (fulfillments/end/time/timestamp) cannot be provided as the order has not been picked up"]
        );
    }

    #[tokio::test]
    async fn ready_to_ship_needs_pickup_range() {
        let harness = Harness::default();
        Scope::new(&harness.store, SESSION, TRANSACTION)
            .save("F1:rts", json!("yes"))
            .await;
        let order = json!({ "fulfillments": [{ "id": "F1", "start": { "time": {} } }] });
        let result = harness
            .run(&OnUpdate(Profile::Current), "STANDARD_FLOW", &on_update("ONDC:LOG10", order))
            .await;
        assert_eq!(
            result.failed,
            vec!["Pickup time range (fulfillments/start/time/range) to be provided if ready_to_ship = yes in /update"]
        );
    }

    #[tokio::test]
    async fn weight_differential() {
        let order = json!({
            "fulfillments": [
                {
                    "id": "F1",
                    "state": { "descriptor": { "code": "Out-for-delivery" } },
                    "tags": [{ "code": "linked_order_diff", "list": [] }]
                },
                { "id": "F2", "state": { "descriptor": { "code": "Agent-assigned" } }, "tags": [] }
            ],
            "quote": { "breakup": [{ "@ondc/org/title_type": "diff" }] }
        });
        let result = Harness::default()
            .run(&OnUpdate(Profile::Current), flows::WEIGHT_DIFFERENTIAL, &on_update("ONDC:LOG10", order))
            .await;
        assert_eq!(
            result.failed,
            vec![
                "'linked_order_diff' and 'linked_order_diff_proof' tags are missing in fulfillment.tags",
                "'diff' and 'tax_diff' titles are missing in quote.breakup",
            ]
        );
    }
}
