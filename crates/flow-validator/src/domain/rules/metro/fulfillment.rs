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
    chrono::{DateTime, Utc},
    serde_json::Value,
};

/// Each selected item needs one fulfillment per unit, plus `extra`, and every
/// id must resolve to a fulfillment of the order.
fn check_mapping(checks: &mut Checks, order: &Value, extra: u64) {
    let fulfillments = array(&order["fulfillments"]);
    for item in array(&order["items"]) {
        let id = item["id"].as_str().unwrap_or("undefined");
        let ids = array(&item["fulfillment_ids"]);
        let expected = item["quantity"]["selected"]["count"]
            .as_u64()
            .map(|count| count + extra);
        let expected_shown = expected.map_or_else(|| "NaN".to_owned(), |n| n.to_string());
        checks.assert(
            expected.is_some_and(|expected| usize::try_from(expected).is_ok_and(|e| e == ids.len())),
            format!("Number of fulfillments are expected as per the selected quantity for item {id}"),
            format!(
                "In /items, expected fulfillment_ids.length to be {expected_shown}, but got {}",
                ids.len()
            ),
        );

        match ids
            .iter()
            .find(|reference| !fulfillments.iter().any(|f| f["id"] == **reference))
        {
            Some(missing) => checks.fail(format!(
                "In /items, Fulfillment ID '{}' not found in fulfillments array",
                missing.as_str().unwrap_or("undefined")
            )),
            None => checks.pass(format!(
                "All fulfillment ids in /items for {id} are correctly mapped to the fulfillments array"
            )),
        }
    }
}

pub struct OnSelect;

#[async_trait::async_trait]
impl Rule for OnSelect {
    fn name(&self) -> &'static str {
        "metro::on_select"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();
        check_mapping(&mut checks, &ctx.message.body()["order"], 0);
        checks.finish()
    }
}

pub struct OnInit;

#[async_trait::async_trait]
impl Rule for OnInit {
    fn name(&self) -> &'static str {
        "metro::on_init"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();
        check_mapping(&mut checks, &ctx.message.body()["order"], 0);
        checks.finish()
    }
}

/// Tickets must stay valid past the status update that issues them.
fn tickets_valid(fulfillments: &[Value], context: Option<DateTime<Utc>>) -> bool {
    fulfillments
        .iter()
        .filter(|fulfillment| fulfillment["type"] == "TICKET")
        .flat_map(|fulfillment| array(&fulfillment["stops"]))
        .all(|stop| {
            let valid_upto = crate::domain::message::parse_timestamp(&stop["authorization"]["valid_upto"]);
            matches!((valid_upto, context), (Some(valid_upto), Some(context)) if valid_upto > context)
        })
}

/// The status update carries one fulfillment per ticket plus the trip.
pub struct OnStatus;

#[async_trait::async_trait]
impl Rule for OnStatus {
    fn name(&self) -> &'static str {
        "metro::on_status"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];

        check_mapping(&mut checks, order, 1);
        checks.assert(
            tickets_valid(array(&order["fulfillments"]), ctx.message.context_timestamp()),
            "Authorization.valid_to timestamp is valid w.r.t context.timestamp for fulfillment with type 'TICKET'",
            "Authorization.valid_to timestamp should be greater than context.timestamp for fulfillment with type 'TICKET'",
        );

        if ctx.flow == flows::DELAYED_CANCELLATION {
            let status = order["status"].as_str().unwrap_or("undefined");
            checks.assert(
                status == "COMPLETED",
                format!("Order status is valid, current status : {status}"),
                "Order status should be 'COMPLETED'",
            );
        }

        checks.finish()
    }
}
