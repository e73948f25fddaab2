//! Rules for metro ticketing (ONDC:TRV11).
//!
//! Every metro rule appends its action to the transaction's ApiMap so that a
//! later `cancel` can be told apart by what preceded it.

use {
    super::{Context, Rule, RuleSet},
    crate::domain::{Action, report::TestResult, state::ApiMapEntry},
    sync_response::WithSyncResponse,
};

mod cancel;
mod catalog;
mod fulfillment;
mod order;
pub mod sync_response;

pub use {
    cancel::{Cancel, OnCancel},
    catalog::{OnSearch, Search, Select},
    fulfillment::{OnInit, OnSelect, OnStatus},
    order::{Confirm, OnUpdate},
};

pub const LOCATOR: &str = "metro";

pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(Action::Search, WithSyncResponse(Search))
        .with(Action::OnSearch, WithSyncResponse(OnSearch))
        .with(Action::Select, WithSyncResponse(Select))
        .with(Action::OnSelect, WithSyncResponse(OnSelect))
        .with(Action::Init, WithSyncResponse(Recorded))
        .with(Action::OnInit, WithSyncResponse(OnInit))
        .with(Action::Confirm, WithSyncResponse(Confirm))
        .with(Action::OnConfirm, WithSyncResponse(Recorded))
        .with(Action::Status, WithSyncResponse(Recorded))
        .with(Action::OnStatus, WithSyncResponse(OnStatus))
        .with(Action::Cancel, WithSyncResponse(Cancel))
        .with(Action::OnCancel, WithSyncResponse(OnCancel))
        .with(Action::Update, WithSyncResponse(Recorded))
        .with(Action::OnUpdate, WithSyncResponse(OnUpdate))
        .with(Action::Track, WithSyncResponse(Recorded))
        .with(Action::OnTrack, WithSyncResponse(Recorded))
}

/// Records the action in the ApiMap and runs no checks.
pub struct Recorded;

#[async_trait::async_trait]
impl Rule for Recorded {
    fn name(&self) -> &'static str {
        "metro::recorded"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        record(ctx).await;
        ctx.checks().finish()
    }
}

async fn record(ctx: &Context<'_>) {
    ctx.scope().record(ApiMapEntry::Action(ctx.action)).await
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            rules::testing::{Harness, SESSION, TRANSACTION, message},
            state::Scope,
        },
        serde_json::json,
    };

    #[tokio::test]
    async fn sync_response_defects_precede_rule_checks() {
        let mut message = message("init", json!({ "domain": "ONDC:TRV11" }), json!({}));
        message.json_response = Some(json!({ "response": {
            "context": { "domain": "ONDC:TRV11" },
            "message": { "ack": { "status": "ACK" } }
        } }));

        let harness = Harness::default();
        let result = harness
            .run(&WithSyncResponse(Recorded), "METRO_FLOW", &message)
            .await;
        assert_eq!(result.failed.len(), 1);
        assert!(result.failed[0].starts_with(r#"Issue with sync response: "context.action" is required"#));
        assert_eq!(result.passed, vec!["Validated init"]);
        assert_eq!(result.response["message"]["ack"]["status"], "ACK");

        assert_eq!(
            Scope::new(&harness.store, SESSION, TRANSACTION).api_map().await,
            vec![ApiMapEntry::Action(Action::Init)]
        );
    }
}
