use {
    super::{
        LOG11,
        delivery_fulfillments,
        fulfillment::{self, Lifecycle},
        state_code,
    },
    crate::domain::{
        check::Checks,
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, STATES_AFTER_PICKUP, flows},
        },
    },
    serde_json::Value,
};

const DELAY: &str = "fulfillment_delay";
const PICKUP_DELAY_REASONS: [&str; 12] = [
    "001", "002", "003", "004", "005", "006", "007", "008", "009", "010", "011", "012",
];
const DELIVERY_DELAY_REASONS: [&str; 8] = ["001", "002", "003", "004", "005", "006", "007", "008"];

pub struct OnStatus;

#[async_trait::async_trait]
impl Rule for OnStatus {
    fn name(&self) -> &'static str {
        "logistics::on_status"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        fulfillment::check_payment(&mut checks, order);

        let lifecycle = Lifecycle {
            awb_required: ctx.message.domain() == Some(LOG11),
            picked_up: &STATES_AFTER_PICKUP,
        };
        for delivery in delivery_fulfillments(order) {
            fulfillment::check_delivery(ctx, &mut checks, order, delivery, &lifecycle).await;

            match state_code(delivery) {
                Some("Pickup-rescheduled") => pickup_delay(&mut checks, &delivery["tags"]),
                Some("Delivery-rescheduled") => delivery_delay(&mut checks, &delivery["tags"]),
                Some("Order-delivered") if ctx.flow == flows::CASH_ON_DELIVERY => {
                    checks.assert(
                        common::tag(&delivery["tags"], "cod_collection_detail").is_some(),
                        r#"fulfillments have the "cod_settlement_details" tag"#,
                        r#"fulfillments must have a tag with code "cod_settlement_details""#,
                    );
                }
                _ => {}
            }
        }

        checks.finish()
    }
}

fn has_entry(tag: &Value, code: &str, value: &str) -> bool {
    common::array(&tag["list"])
        .iter()
        .any(|entry| entry["code"] == code && entry["value"] == value)
}

/// A rescheduled pickup carries one delay tag for the failed pickup attempt.
fn pickup_delay(checks: &mut Checks, tags: &Value) {
    let Some(delay) = common::tag(tags, DELAY) else {
        checks.fail("'fulfillment_delay' tag not found");
        return;
    };
    checks.pass(r#"fulfillments have the "fulfillment_delay" tag"#);
    checks.assert(
        has_entry(delay, "state", "Order-picked-up"),
        r#"Valid state in "fulfillment_delay" tag"#,
        "Missing or invalid 'state' with value 'Order-picked-up' in fulfillment_delay tag",
    );
    checks.assert(
        has_entry(delay, "attempt", "yes"),
        r#"Valid attempt in "fulfillment_delay" tag"#,
        "Missing or invalid 'attempt' with value 'yes' in fulfillment_delay tag",
    );
    match common::list_value(delay, "reason_id") {
        None => checks.fail("'reason_id' is missing"),
        Some(reason) => checks.assert(
            PICKUP_DELAY_REASONS.contains(&reason),
            r#"Valid reason id in "fulfillment_delay" tag"#,
            format!(
                "Invalid 'reason_id'. Must be one of {} in fulfillment_delay tag",
                PICKUP_DELAY_REASONS.join(", ")
            ),
        ),
    }
}

/// A rescheduled delivery carries one delay tag for the pickup and one for
/// the delivery attempt.
fn delivery_delay(checks: &mut Checks, tags: &Value) {
    let delays = common::tags(tags, DELAY).collect::<Vec<_>>();
    checks.assert(
        delays.len() >= 2,
        r#"fulfillments have two "fulfillment_delay" tags"#,
        "Expected two 'fulfillment_delay' tags",
    );

    for state in ["Order-picked-up", "Order-delivered"] {
        let Some(delay) = delays.iter().find(|delay| has_entry(delay, "state", state)) else {
            checks.fail(format!("No 'fulfillment_delay' tag found with state = '{state}'"));
            continue;
        };
        checks.pass(format!(r#"fulfillment ({state}) has "fulfillment_delay" tag"#));
        checks.assert(
            has_entry(delay, "attempt", "yes"),
            format!(r#"fulfillment ({state}) has 'attempt' tag in "fulfillment_delay" tag"#),
            format!("Missing or invalid 'attempt' = 'yes' for state '{state}'"),
        );
        match common::list_value(delay, "reason_id") {
            None => checks.fail(format!("'reason_id' is missing for state '{state}'")),
            Some(reason) => checks.assert(
                DELIVERY_DELAY_REASONS.contains(&reason),
                format!(r#"fulfillment ({state}) has 'reason_id' tag in "fulfillment_delay" tag"#),
                format!(
                    "Invalid 'reason_id' for state '{state}'. Must be one of {}",
                    DELIVERY_DELAY_REASONS.join(", ")
                ),
            ),
        }
    }
}
