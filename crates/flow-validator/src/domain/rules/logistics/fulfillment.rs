//! Order lifecycle checks shared by the status and cancellation callbacks.

use {
    super::state_code,
    crate::domain::{
        check::Checks,
        message::parse_timestamp,
        rules::{Context, common},
    },
    serde_json::Value,
};

const AWB_NO: &str = "@ondc/org/awb_no";
const PICKUP_TIMESTAMP: &str = "pickupTimestamp";
const PRE_PICKUP_STATES: [&str; 4] = ["Pending", "Agent-assigned", "Searching-for-agent", "At-pickup"];
const IN_PROGRESS_STATES: [&str; 3] = ["Agent-assigned", "Order-picked-up", "Out-for-delivery"];
const IN_TRANSIT_STATES: [&str; 3] = ["Out-for-delivery", "At-destination-hub", "In-transit"];

/// How a callback judges the Delivery fulfillments it reports.
pub(super) struct Lifecycle {
    /// Whether every Delivery fulfillment must carry an airway bill number.
    pub awb_required: bool,
    /// States in which the shipment counts as picked up for tracking.
    pub picked_up: &'static [&'static str],
}

/// Payment status and timestamp against the order state and payment type.
pub(super) fn check_payment(checks: &mut Checks, order: &Value) {
    let state = order["state"].as_str();
    let payment = &order["payment"];
    let kind = payment["type"].as_str();
    let status = payment["status"].as_str();
    let stamped = common::is_present(&payment["time"]["timestamp"]);
    let completed_on_fulfillment = state == Some("Complete") && kind == Some("ON-FULFILLMENT");

    if completed_on_fulfillment {
        checks.assert(
            status == Some("PAID"),
            "Payment status validation passed",
            "Payment status should be 'PAID' once the order is complete for payment type 'ON-FULFILLMENT'",
        );
    }

    if completed_on_fulfillment && status == Some("PAID") {
        checks.assert(
            stamped,
            "Payment timestamp validation passed",
            "Payment timestamp should be provided once the order is complete and payment has been made",
        );
    } else if kind == Some("POST-FULFILLMENT") && status == Some("PAID") {
        checks.assert(
            !stamped,
            "Payment timestamp validation passed",
            "Payment timestamp should not be provided as payment type is 'POST-FULFILLMENT'",
        );
    } else if status == Some("NOT-PAID") {
        checks.assert(
            !stamped,
            "Payment timestamp validation passed",
            "Payment timestamp should not be provided if the payment is yet not made",
        );
    }
}

/// State, timestamp and tracking checks of one Delivery fulfillment. Records
/// the pickup timestamp once the order is picked up so that later callbacks
/// can check it stays unchanged.
pub(super) async fn check_delivery(
    ctx: &Context<'_>,
    checks: &mut Checks,
    order: &Value,
    fulfillment: &Value,
    lifecycle: &Lifecycle,
) {
    let scope = ctx.scope();
    let context = ctx.message.context_timestamp();
    let state = state_code(fulfillment).unwrap_or("undefined");
    let pickup = &fulfillment["start"]["time"]["timestamp"];
    let delivery = &fulfillment["end"]["time"]["timestamp"];

    if lifecycle.awb_required {
        checks.assert(
            common::is_present(&fulfillment[AWB_NO]),
            "AWB number validation passed",
            "AWB no is required for P2H2P shipments",
        );
    }

    checks.assert(
        !(PRE_PICKUP_STATES.contains(&state)
            && (common::is_present(pickup) || common::is_present(delivery))),
        "Pickup/Delivery timestamp requirement validation passed",
        format!("Pickup/Delivery timestamp should not be provided when fulfillment state is '{state}'"),
    );

    checks.assert(
        !(IN_PROGRESS_STATES.contains(&state) && order["state"] != "In-progress"),
        "Order state validation passed",
        "Order state should be 'In-progress'",
    );

    if state == "Order-picked-up" && common::is_present(pickup) {
        scope.save(PICKUP_TIMESTAMP, pickup.clone()).await;
        checks.assert(
            common::not_later(parse_timestamp(pickup), context),
            "Pickup timestamp validation passed",
            "Pickup timestamp cannot be future-dated w.r.t context timestamp",
        );
    }

    if IN_TRANSIT_STATES.contains(&state) {
        if let Some(recorded) = scope.fetch(PICKUP_TIMESTAMP).await {
            checks.assert(
                *pickup == recorded,
                "Pickup timestamp immutability validation passed",
                format!("Pickup timestamp cannot change once fulfillment state is '{state}'"),
            );
        }
    }

    if state == "Order-delivered" && common::is_present(delivery) {
        checks.assert(
            common::not_later(parse_timestamp(delivery), context),
            "Delivery timestamp validation passed",
            "Delivery timestamp cannot be future-dated w.r.t context timestamp",
        );
    }

    let tracking = common::is_present(&fulfillment["tracking"]);
    if lifecycle.picked_up.contains(&state) && tracking {
        checks.assert(
            common::tag(&fulfillment["tags"], "tracking").is_some(),
            "Tracking tag validation passed",
            "Tracking tag must be provided once order is picked up and tracking is enabled",
        );
    } else if !tracking {
        checks.fail("tracking should be enabled (true) in fulfillments/tracking");
    }
}
