use {
    crate::domain::{
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, array, flows},
        },
    },
    rust_decimal::Decimal,
};

const TITLE_TYPE: &str = "@ondc/org/title_type";

pub struct OnInit;

#[async_trait::async_trait]
impl Rule for OnInit {
    fn name(&self) -> &'static str {
        "logistics::on_init"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let quote = &ctx.message.body()["order"]["quote"];
        let breakup = array(&quote["breakup"]);

        if !quote.is_null() {
            let price = &quote["price"]["value"];
            checks.assert(
                common::raw_number(price).is_some_and(|raw| common::has_two_or_less_decimal_places(&raw)),
                "Quote price decimal validation passed",
                "Quote price value should not have more than 2 decimal places",
            );

            let mut total = Some(Decimal::ZERO);
            for line in breakup {
                let title = line[TITLE_TYPE].as_str().unwrap_or("undefined");
                let value = &line["price"]["value"];
                checks.assert(
                    common::raw_number(value).is_some_and(|raw| common::has_two_or_less_decimal_places(&raw)),
                    format!("Decimal validation passed for breakup price - '{title}'"),
                    format!("Price value for '{title}' should not have more than 2 decimal places"),
                );
                total = total
                    .zip(common::decimal(value))
                    .map(|(total, value)| (total + value).round_dp(2));
            }

            checks.assert(
                breakup.iter().any(|line| line[TITLE_TYPE] == "tax"),
                "Tax line item validation passed",
                "Fulfillment charges will have a separate quote line item for taxes",
            );

            let price = common::decimal(price);
            let shown = |value: Option<Decimal>| {
                value.map_or_else(|| "NaN".to_owned(), |value| value.normalize().to_string())
            };
            checks.assert(
                price.is_some() && price == total,
                "Quote price matches breakup total",
                format!(
                    "Quote price {} does not match the breakup total {}",
                    shown(price),
                    shown(total)
                ),
            );
        }

        if ctx.flow == flows::CASH_ON_DELIVERY {
            checks.assert(
                breakup.iter().any(|line| line[TITLE_TYPE] == "cod"),
                "cod charges in quote breakup validation passed",
                "'cod' (along with its tax) charges are missing in quote.breakup",
            );
        }

        checks.finish()
    }
}
