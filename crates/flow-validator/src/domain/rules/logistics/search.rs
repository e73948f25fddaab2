use {
    super::Profile,
    crate::domain::{
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, LBNP_FEATURE_FLOWS, array, flows},
        },
    },
};

pub struct Search(pub Profile);

#[async_trait::async_trait]
impl Rule for Search {
    fn name(&self) -> &'static str {
        match self.0 {
            Profile::Current => "logistics::search",
            Profile::Legacy => "logistics-legacy::search",
        }
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let intent = &ctx.message.body()["intent"];

        let holidays = array(&intent["provider"]["time"]["schedule"]["holidays"]);
        let upcoming = match ctx.message.context_timestamp() {
            Some(context) => holidays.iter().all(|holiday| {
                common::day(holiday).is_some_and(|day| common::is_later_day(day, context))
            }),
            None => holidays.is_empty(),
        };
        checks.assert(
            upcoming,
            "provider/holidays date check validation passed",
            "provider/holidays should not be past dated",
        );

        if self.0 == Profile::Legacy {
            return checks.finish();
        }

        if LBNP_FEATURE_FLOWS.contains(&ctx.flow) {
            checks.assert(
                common::features_published(ctx.flow, &intent["tags"], "lbnp_features"),
                "Feature code in catalog/tags validation passed ",
                "Feature code needs to be published in the catalog/tags",
            );
        }

        if ctx.flow == flows::PREPAID_PAYMENT {
            checks.assert(
                intent["payment"]["type"] == "ON-ORDER",
                "Payment type validation passed",
                "Payment type should be ON-ORDER for prepaid payment flow",
            );
        }

        if ctx.flow == flows::CASH_ON_DELIVERY {
            let linked_order = common::tag(&intent["fulfillment"]["tags"], "linked_order");
            checks.assert(
                linked_order.is_some_and(|tag| common::has_list_entry(tag, "cod_order", "yes")),
                "cod_order tag validation passed",
                r#"cod_order tag with value "yes" should be present inside linked_order tag list"#,
            );
            checks.assert(
                linked_order.is_some_and(|tag| common::list_value(tag, "collection_amount").is_some()),
                "collection_amount tag validation passed",
                "collection_amount tag should be present inside linked_order tag list",
            );
        }

        checks.finish()
    }
}
