use {
    super::Profile,
    crate::domain::{
        check::Checks,
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, LSP_FEATURE_FLOWS, array, flows},
        },
    },
    chrono::{DateTime, Duration, Utc},
    serde_json::Value,
    std::collections::HashSet,
};

pub struct OnSearch(pub Profile);

/// Categories whose turnaround date follows from the published duration.
const DURATION_CATEGORIES: [&str; 3] = ["Standard Delivery", "Express Delivery", "Next Day Delivery"];
/// Categories that deliver on the day of the search.
const SAME_DAY_CATEGORIES: [&str; 3] = ["Same Day Delivery", "Immediate Delivery", "Instant Delivery"];
const NEXT_DAY: &str = "Next Day Delivery";

impl OnSearch {
    fn duration_based(&self, category: &str) -> bool {
        match self.0 {
            Profile::Current => DURATION_CATEGORIES.contains(&category),
            Profile::Legacy => category != NEXT_DAY && DURATION_CATEGORIES.contains(&category),
        }
    }
}

fn format_day(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Turnaround date of an item: whole days and hours of the duration after
/// the context timestamp.
fn item_tat_date(context: DateTime<Utc>, duration: &Value) -> Option<String> {
    let hours = common::iso_duration(duration.as_str()?)?.num_hours();
    if hours == 0 {
        return None;
    }
    context
        .checked_add_signed(Duration::try_hours(hours)?)
        .map(format_day)
}

fn or_undefined(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("undefined")
}

#[async_trait::async_trait]
impl Rule for OnSearch {
    fn name(&self) -> &'static str {
        match self.0 {
            Profile::Current => "logistics::on_search",
            Profile::Legacy => "logistics-legacy::on_search",
        }
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let catalog = &ctx.message.body()["catalog"];
        let providers = array(&catalog["bpp/providers"]);
        let context = ctx.message.context_timestamp();

        for provider in providers {
            self.check_provider(&mut checks, provider, context);
        }

        if self.0 == Profile::Legacy {
            return checks.finish();
        }

        if LSP_FEATURE_FLOWS.contains(&ctx.flow) {
            checks.assert(
                common::features_published(ctx.flow, &catalog["tags"], "lsp_features"),
                "Feature code in catalog/tags validation passed ",
                "Feature code needs to be published in the catalog/tags",
            );
        }

        if ctx.flow == flows::CASH_ON_DELIVERY {
            let cod_order = providers.iter().any(|provider| {
                common::tag(&provider["tags"], "special_req")
                    .is_some_and(|tag| common::has_list_entry(tag, "cod_order", "yes"))
            });
            let cod_item = providers
                .iter()
                .flat_map(|provider| array(&provider["items"]))
                .any(|item| {
                    common::tag(&item["tags"], "type")
                        .is_some_and(|tag| common::has_list_entry(tag, "type", "cod"))
                });
            checks.assert(
                cod_order,
                "cod_order tag inside special_req validation passed",
                r#"cod_order tag with value "yes" should be present inside "special_req" tag under bpp/providers.tags"#,
            );
            checks.assert(
                cod_item,
                "COD item tag validation passed",
                r#"At least one item in bpp/providers/items should have tag with code "type" and value "cod""#,
            );
        }

        checks.finish()
    }
}

impl OnSearch {
    fn check_provider(&self, checks: &mut Checks, provider: &Value, context: Option<DateTime<Utc>>) {
        let fulfillments = array(&provider["fulfillments"]);
        let fulfillment_ids = fulfillments
            .iter()
            .filter_map(|fulfillment| fulfillment["id"].as_str())
            .collect::<HashSet<_>>();
        let shipped = |kind: &str| fulfillments.iter().any(|f| f["type"] == kind);
        checks.assert(
            shipped("Delivery") && shipped("RTO"),
            "Forward and backwardshipment validation passed",
            "Both forward shipment (Delivery) and backward shipment (RTO) should be provided in the catalog",
        );

        let current_date = context.map(format_day);
        let next_date = context
            .and_then(|context| context.checked_add_signed(Duration::days(1)))
            .map(format_day);

        for category in array(&provider["categories"]) {
            let id = category["id"].as_str().unwrap_or_default();
            let time = &category["time"];
            let timestamp = time["timestamp"].as_str();

            if self.duration_based(id) {
                let expected =
                    context.and_then(|context| common::date_after(context, &time["duration"]));
                checks.assert(
                    expected.is_some() && timestamp == expected.as_deref(),
                    format!(
                        "TAT validation passed for category {id} (Expected: {})",
                        or_undefined(&expected)
                    ),
                    format!(
                        "In bpp/providers/categories, for {id}, expected TAT date should be {} based on duration ({})",
                        or_undefined(&expected),
                        time["duration"].as_str().unwrap_or("undefined"),
                    ),
                );
            }
            if SAME_DAY_CATEGORIES.contains(&id) && (current_date.is_none() || timestamp != current_date.as_deref()) {
                checks.fail(format!(
                    "In bpp/providers/categories, for {id}, TAT date should be {}",
                    or_undefined(&current_date)
                ));
            }
            if self.0 == Profile::Legacy && id == NEXT_DAY && (next_date.is_none() || timestamp != next_date.as_deref()) {
                checks.fail(format!(
                    "In bpp/providers/categories, for Next Day Delivery, TAT date should be {}",
                    or_undefined(&next_date)
                ));
            }
        }

        for item in array(&provider["items"]) {
            let id = item["id"].as_str().unwrap_or("undefined");
            let category = item["category_id"].as_str().unwrap_or_default();
            let time = &item["time"];
            let timestamp = time["timestamp"].as_str();
            let timed = !time.is_null();

            if self.duration_based(category) && timed {
                let expected = context.and_then(|context| item_tat_date(context, &time["duration"]));
                checks.assert(
                    expected.is_some() && timestamp == expected.as_deref(),
                    format!(
                        "TAT validation passed for item {id} ({category}) (Expected: {})",
                        or_undefined(&expected)
                    ),
                    format!(
                        "For item {id} ({category}), expected TAT date should be {} based on duration ({})",
                        or_undefined(&expected),
                        time["duration"].as_str().unwrap_or("undefined"),
                    ),
                );
            }
            if SAME_DAY_CATEGORIES.contains(&category)
                && timed
                && (current_date.is_none() || timestamp != current_date.as_deref())
            {
                checks.fail(format!(
                    "For {category}, TAT date should be {} (item {id})",
                    or_undefined(&current_date)
                ));
            }
            if self.0 == Profile::Legacy
                && category == NEXT_DAY
                && timed
                && (next_date.is_none() || timestamp != next_date.as_deref())
            {
                checks.fail(format!(
                    "For Next Day Delivery, TAT date should be {} - item {id}",
                    or_undefined(&next_date)
                ));
            }

            checks.assert(
                item["fulfillment_id"]
                    .as_str()
                    .is_some_and(|fulfillment| fulfillment_ids.contains(fulfillment)),
                format!("Fulfillment ID mapping validation passed for item {id}"),
                format!("Item {id} and fulfillment_id does not match any fulfillment ID"),
            );
        }
    }
}
