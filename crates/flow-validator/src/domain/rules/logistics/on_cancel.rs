use {
    super::{
        delivery_fulfillments,
        fulfillment::{self, Lifecycle},
        shipment_type,
    },
    crate::domain::{
        report::TestResult,
        rules::{Context, Rule},
    },
};

pub struct OnCancel;

#[async_trait::async_trait]
impl Rule for OnCancel {
    fn name(&self) -> &'static str {
        "logistics::on_cancel"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let order = &ctx.message.body()["order"];
        fulfillment::check_payment(&mut checks, order);

        let lifecycle = Lifecycle {
            awb_required: shipment_type(order) == Some("P2H2P"),
            picked_up: &["Order-picked-up", "Out-for-delivery"],
        };
        for delivery in delivery_fulfillments(order) {
            fulfillment::check_delivery(ctx, &mut checks, order, delivery, &lifecycle).await;
        }

        checks.finish()
    }
}
