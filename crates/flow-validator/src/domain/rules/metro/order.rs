use {
    super::record,
    crate::domain::{
        check::Checks,
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{array, flows},
        },
    },
    regex::Regex,
    serde_json::Value,
    std::sync::LazyLock,
};

static COORDINATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d{1,3}\.\d{6}$").unwrap());

const BREAKUP_TITLES: [&str; 4] = ["BASE_FARE", "REFUND", "CANCELLATION_CHARGES", "DISTANCE_FARE"];
const CANCELLATION_TITLES: [&str; 2] = ["REFUND", "CANCELLATION_CHARGES"];

fn gps_precise(gps: &Value) -> bool {
    gps.as_str().is_some_and(|gps| {
        gps.split(',')
            .all(|coordinate| COORDINATE.is_match(coordinate.trim()))
    })
}

/// Stops chain through `parent_item_id`: every stop but the first names the
/// stop before it.
fn stops_chained(stops: &[Value]) -> bool {
    stops
        .windows(2)
        .all(|pair| pair[1]["parent_item_id"] == pair[0]["id"])
}

/// Checks shared by every message that carries a full order.
pub(super) fn check_order(checks: &mut Checks, order: &Value) {
    for fulfillment in array(&order["fulfillments"]) {
        let stops = array(&fulfillment["stops"]);
        checks.assert(
            stops
                .iter()
                .filter(|stop| !stop["location"]["gps"].is_null())
                .all(|stop| gps_precise(&stop["location"]["gps"])),
            "Stops.gps has 6 decimal precision",
            "GPS must have 6 decimal precision",
        );
        checks.assert(
            stops_chained(stops),
            "parent_item_id refers to previous stop id",
            "parent_item_id should refer to previous stop id",
        );
    }

    let Some(breakup) = order["quote"]["breakup"].as_array() else {
        return;
    };
    let titles: Vec<&str> = breakup
        .iter()
        .map(|entry| entry["title"].as_str().unwrap_or_default())
        .collect();
    let cancelling = matches!(order["status"].as_str(), Some("CANCELLED" | "SOFT_CANCEL"));

    if titles.iter().any(|title| !BREAKUP_TITLES.contains(title)) {
        checks.fail("Quote.breakup validation: Invalid title in quote.breakup");
    } else if !cancelling && titles.iter().any(|title| CANCELLATION_TITLES.contains(title)) {
        checks.fail(
            "Quote.breakup validation: REFUND and CANCELLATION_CHARGES should be included only if cancellation is being made",
        );
    } else {
        checks.pass("Valid titles in quote.breakup");
    }
}

pub struct Confirm;

#[async_trait::async_trait]
impl Rule for Confirm {
    fn name(&self) -> &'static str {
        "metro::confirm"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();
        check_order(&mut checks, &ctx.message.body()["order"]);
        checks.finish()
    }
}

pub struct OnUpdate;

#[async_trait::async_trait]
impl Rule for OnUpdate {
    fn name(&self) -> &'static str {
        "metro::on_update"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];

        if ctx.flow == flows::DELAYED_CANCELLATION {
            let status = order["status"].as_str().unwrap_or("undefined");
            checks.assert(
                status == "CANCELLED",
                format!("Order status is valid, current status : {status}"),
                "Order status should be 'CANCELLED'",
            );
        }
        check_order(&mut checks, order);

        checks.finish()
    }
}
