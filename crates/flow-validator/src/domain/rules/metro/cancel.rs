//! Cancellation in metro flows is told apart by the action that preceded it:
//! after `on_confirm` a buyer soft or confirmed cancel, after `on_cancel` the
//! confirmation of a soft cancel, after `on_status` a technical cancel.

use {
    super::order::check_order,
    crate::domain::{
        Action,
        check::Checks,
        report::TestResult,
        rules::{
            Context,
            Rule,
            common::{BUYER_CANCEL_CODES, flows},
        },
        state::ApiMapEntry,
    },
    serde_json::Value,
};

fn check_reason(checks: &mut Checks, message: &Value) {
    let reason = &message["cancellation_reason_id"];
    checks.assert(
        reason
            .as_str()
            .is_some_and(|reason| BUYER_CANCEL_CODES.contains(&reason)),
        format!(
            "Valid cancellation reason id ({})",
            reason.as_str().unwrap_or("undefined")
        ),
        "Appropriate cancellation reason id to be used for buyer side cancellation",
    );
}

pub struct Cancel;

#[async_trait::async_trait]
impl Rule for Cancel {
    fn name(&self) -> &'static str {
        "metro::cancel"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let scope = ctx.scope();
        let message = ctx.message.body();
        let code = message["descriptor"]["code"].as_str();

        let entry = match scope.last_action().await {
            Some(ApiMapEntry::Action(Action::OnConfirm)) => {
                match code {
                    Some(code @ ("SOFT_CANCEL" | "CONFIRM_CANCEL")) => {
                        checks.pass(format!("Valid message.descriptor.code ({code})"));
                        check_reason(&mut checks, message);
                    }
                    _ => checks.fail("message.descriptor.code should be 'SOFT_CANCEL/CONFIRM_CANCEL"),
                }
                match code {
                    Some("SOFT_CANCEL") => Some(ApiMapEntry::SoftCancel),
                    Some("CONFIRM_CANCEL") => Some(ApiMapEntry::ConfirmCancel),
                    _ => None,
                }
            }
            Some(ApiMapEntry::Action(Action::OnCancel)) => {
                if code == Some("CONFIRM_CANCEL") {
                    checks.pass("Valid message.descriptor.code (CONFIRM_CANCEL)");
                    check_reason(&mut checks, message);
                } else {
                    checks.fail("message.descriptor.code should be 'CONFIRM_CANCEL");
                }
                Some(ApiMapEntry::ConfirmCancel)
            }
            Some(ApiMapEntry::Action(Action::OnStatus)) => Some(ApiMapEntry::TechnicalCancel),
            _ => Some(ApiMapEntry::Action(ctx.action)),
        };
        if let Some(entry) = entry {
            scope.record(entry).await;
        }

        checks.finish()
    }
}

pub struct OnCancel;

#[async_trait::async_trait]
impl Rule for OnCancel {
    fn name(&self) -> &'static str {
        "metro::on_cancel"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let scope = ctx.scope();
        let order = &ctx.message.body()["order"];
        let status = order["status"].as_str().unwrap_or("undefined");

        match scope.last_action().await {
            Some(ApiMapEntry::SoftCancel) => checks.assert(
                status == "SOFT_CANCEL",
                format!("Order status is valid : {status}"),
                "Order status should be 'SOFT_CANCEL'",
            ),
            Some(ApiMapEntry::ConfirmCancel) => {
                let expected = match ctx.flow {
                    flows::USER_CANCELLATION | flows::TECHNICAL_CANCELLATION => Some("CANCELLED"),
                    flows::DELAYED_CANCEL_REJECTED | flows::DELAYED_CANCEL_ACCEPTED => {
                        Some("CANCELLATION_INITIATED")
                    }
                    _ => None,
                };
                if let Some(expected) = expected {
                    checks.assert(
                        status == expected,
                        format!("Order status is valid : {status}"),
                        format!("Order status should be valid, current status:  {status}"),
                    );
                }
            }
            _ => {}
        }
        scope.record(ApiMapEntry::Action(ctx.action)).await;
        check_order(&mut checks, order);

        checks.finish()
    }
}
