use {
    super::record,
    crate::domain::{
        report::TestResult,
        rules::{Context, Rule, common::array},
        state::{self, Scope},
    },
    serde_json::Value,
};

const CATALOG_ITEMS: &str = "onSearchItemArr";

fn count(value: &Value) -> Option<u64> {
    value["count"].as_u64()
}

/// Opens a transaction: records it for the flow.
pub struct Search;

#[async_trait::async_trait]
impl Rule for Search {
    fn name(&self) -> &'static str {
        "metro::search"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        state::record_transaction(ctx.state, ctx.session, ctx.flow, ctx.message.transaction()).await;
        ctx.checks().finish()
    }
}

pub struct OnSearch;

#[async_trait::async_trait]
impl Rule for OnSearch {
    fn name(&self) -> &'static str {
        "metro::on_search"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();

        for provider in array(&ctx.message.body()["catalog"]["providers"]) {
            let fulfillments = array(&provider["fulfillments"]);
            let typed = |kind: &str| fulfillments.iter().all(|f| f["type"] == kind);

            let Some(items) = provider["items"].as_array() else {
                checks.assert(
                    typed("ROUTE"),
                    "Fulfillments.type is ROUTE",
                    "Fulfillments.type should be ROUTE",
                );
                continue;
            };

            ctx.scope()
                .save(CATALOG_ITEMS, Value::Array(items.clone()))
                .await;
            checks.assert(
                typed("TRIP"),
                "Fulfillments.type is TRIP",
                "Fulfillments.type should be TRIP",
            );
            checks.assert(
                items.iter().all(|item| {
                    matches!(
                        (count(&item["quantity"]["minimum"]), count(&item["quantity"]["maximum"])),
                        (Some(minimum), Some(maximum)) if minimum < maximum
                    )
                }),
                "Valid items/quantity maximum and minimum count",
                "Quantity.minimum.count can't be greater than quantity.maximum.count at items",
            );
        }

        checks.finish()
    }
}

/// The catalog recorded by `on_search` for this transaction, else the one
/// recorded by the flow's most recent earlier search.
async fn catalog(ctx: &Context<'_>) -> Option<Value> {
    if let Some(catalog) = ctx.scope().fetch(CATALOG_ITEMS).await {
        return Some(catalog);
    }
    for transaction in state::transaction_ids(ctx.state, ctx.session, ctx.flow)
        .await
        .iter()
        .rev()
    {
        let scope = Scope::new(ctx.state, ctx.session, transaction);
        if let Some(catalog) = scope.fetch(CATALOG_ITEMS).await {
            return Some(catalog);
        }
    }
    None
}

/// Selected quantities against the catalog recorded by `on_search`.
pub struct Select;

#[async_trait::async_trait]
impl Rule for Select {
    fn name(&self) -> &'static str {
        "metro::select"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        let mut checks = ctx.checks();

        let Some(catalog) = catalog(ctx).await else {
            return checks.finish();
        };
        for item in array(&ctx.message.body()["order"]["items"]) {
            let id = item["id"].as_str().unwrap_or("undefined");
            let Some(listed) = array(&catalog).iter().find(|listed| listed["id"] == item["id"]) else {
                tracing::debug!(item = id, "selected item not in catalog");
                continue;
            };
            let selected = count(&item["quantity"]["selected"]);
            let maximum = count(&listed["quantity"]["maximum"]);
            let shown = |count: Option<u64>| count.map_or_else(|| "undefined".to_owned(), |c| c.to_string());
            checks.assert(
                matches!((selected, maximum), (Some(selected), Some(maximum)) if selected <= maximum),
                format!("Valid item quantity for item id: {id}"),
                format!(
                    "Item {id}: Selected count ({}) exceeds the maximum count ({}) in the catalog.",
                    shown(selected),
                    shown(maximum)
                ),
            );
        }

        checks.finish()
    }
}
