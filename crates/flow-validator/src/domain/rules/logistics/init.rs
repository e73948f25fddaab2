use {
    super::Profile,
    crate::domain::{
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{self, array, flows},
        },
    },
};

pub struct Init(pub Profile);

#[async_trait::async_trait]
impl Rule for Init {
    fn name(&self) -> &'static str {
        match self.0 {
            Profile::Current => "logistics::init",
            Profile::Legacy => "logistics-legacy::init",
        }
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        let billing = &order["billing"];

        ctx.scope()
            .save("billingTimestamp", billing["created_at"].clone())
            .await;

        let created_at = common::timestamp_at(billing, "/created_at");
        checks.assert(
            common::not_later(created_at, ctx.message.context_timestamp()),
            "Billing created_at timestamp validation passed",
            "Billing timestamp cannot be future dated w.r.t context/timestamp",
        );
        checks.assert(
            created_at.is_some() && created_at == common::timestamp_at(billing, "/updated_at"),
            "Billing updated_at timestamp validation passed",
            "Billing created_at timestamp should be equal to updated_at",
        );

        if self.0 == Profile::Current && ctx.flow == flows::CASH_ON_DELIVERY {
            let item_types = array(&order["items"])
                .iter()
                .filter_map(|item| common::tag(&item["tags"], "type"))
                .filter_map(|tag| common::list_value(tag, "type"))
                .map(str::to_lowercase)
                .collect::<Vec<_>>();
            let has = |kind: &str| item_types.iter().any(|item_type| item_type == kind);
            if !has("base") {
                checks.fail(r#"At least one item in message.order.items should have a type tag with value "base""#);
            } else if !has("cod") {
                checks.fail(r#"At least one item in message.order.items should have a type tag with value "cod""#);
            } else {
                checks.pass("Both base and cod type items are present");
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
            rules::testing::{Harness, SESSION, TRANSACTION, message},
            state::Scope,
        },
        serde_json::{Value, json},
    };

    fn init(billing: Value, items: Value) -> crate::domain::Message {
        message(
            "init",
            json!({ "domain": "ONDC:LOG11" }),
            json!({ "order": { "billing": billing, "items": items } }),
        )
    }

    fn typed(kind: &str) -> Value {
        json!({ "tags": [{ "code": "type", "list": [{ "code": "type", "value": kind }] }] })
    }

    #[tokio::test]
    async fn billing_timestamps() {
        let harness = Harness::default();
        let message = init(
            json!({ "created_at": "2024-05-01T09:00:00.000Z", "updated_at": "2024-05-01T09:00:00.000Z" }),
            json!([]),
        );
        let result = harness.run(&Init(Profile::Current), "STANDARD_FLOW", &message).await;
        assert_eq!(
            result.passed,
            vec![
                "Billing created_at timestamp validation passed",
                "Billing updated_at timestamp validation passed",
            ]
        );
        assert_eq!(
            Scope::new(&harness.store, SESSION, TRANSACTION)
                .fetch_str("billingTimestamp")
                .await
                .as_deref(),
            Some("2024-05-01T09:00:00.000Z")
        );

        let message = init(
            json!({ "created_at": "2024-05-01T11:00:00.000Z", "updated_at": "2024-05-01T11:30:00.000Z" }),
            json!([]),
        );
        let result = harness.run(&Init(Profile::Legacy), "STANDARD_FLOW", &message).await;
        assert_eq!(
            result.failed,
            vec![
                "Billing timestamp cannot be future dated w.r.t context/timestamp",
                "Billing created_at timestamp should be equal to updated_at",
            ]
        );
    }

    #[tokio::test]
    async fn cash_on_delivery_needs_base_and_cod_items() {
        let billing = json!({ "created_at": "2024-05-01T09:00:00Z", "updated_at": "2024-05-01T09:00:00Z" });
        let harness = Harness::default();

        let both = init(billing.clone(), json!([typed("Base"), typed("cod")]));
        let result = harness.run(&Init(Profile::Current), flows::CASH_ON_DELIVERY, &both).await;
        assert!(result.passed.contains(&"Both base and cod type items are present".to_owned()));

        let base_only = init(billing, json!([typed("base")]));
        let result = harness
            .run(&Init(Profile::Current), flows::CASH_ON_DELIVERY, &base_only)
            .await;
        assert_eq!(
            result.failed,
            vec![r#"At least one item in message.order.items should have a type tag with value "cod""#]
        );
    }
}
