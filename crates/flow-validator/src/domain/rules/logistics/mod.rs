//! Rules for the logistics domains (ONDC:LOG10 and ONDC:LOG11).
//!
//! The legacy logistics catalog reuses several of these rules under the
//! [`Profile::Legacy`] profile.

use {
    super::{
        Context,
        ReadyToShipPolicy,
        RuleSet,
        common::{self, array},
    },
    crate::domain::Action,
    serde_json::Value,
};

mod confirm;
mod fulfillment;
mod init;
mod on_cancel;
mod on_confirm;
mod on_init;
mod on_search;
mod on_status;
mod on_update;
mod search;
mod update;

pub use {
    confirm::Confirm,
    init::Init,
    on_cancel::OnCancel,
    on_confirm::OnConfirm,
    on_init::OnInit,
    on_search::OnSearch,
    on_status::OnStatus,
    on_update::OnUpdate,
    search::Search,
    update::Update,
};

pub const LOCATOR: &str = "logistics";

/// The generation of the logistics protocol a shared rule validates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    /// ONDC:LOG10 and ONDC:LOG11, with feature flags and flow specific
    /// checks.
    Current,
    /// nic2004:60232.
    Legacy,
}

pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(Action::Search, Search(Profile::Current))
        .with(Action::OnSearch, OnSearch(Profile::Current))
        .with(Action::Init, Init(Profile::Current))
        .with(Action::OnInit, OnInit)
        .with(Action::Confirm, Confirm)
        .with(Action::OnConfirm, OnConfirm)
        .with(Action::Update, Update)
        .with(Action::OnUpdate, OnUpdate(Profile::Current))
        .with(Action::OnStatus, OnStatus)
        .with(Action::OnCancel, OnCancel)
        .rest_unchecked()
}

const DELIVERY: &str = "Delivery";
const LOG11: &str = "ONDC:LOG11";
const READY_TO_SHIP: &str = "ready_to_ship";

fn is_delivery(fulfillment: &Value) -> bool {
    fulfillment["type"] == DELIVERY
}

fn state_code(fulfillment: &Value) -> Option<&str> {
    fulfillment["state"]["descriptor"]["code"].as_str()
}

/// The shipment type, carried by the first item's descriptor code.
fn shipment_type(order: &Value) -> Option<&str> {
    order["items"][0]["descriptor"]["code"].as_str()
}

/// The ready-to-ship flag a fulfillment carries in its `state` tag.
fn ready_to_ship_flag(fulfillment: &Value) -> Option<&str> {
    common::tag(&fulfillment["tags"], "state")
        .and_then(|state| common::list_value(state, READY_TO_SHIP))
}

fn rts_key(fulfillment: &Value) -> String {
    format!("{}:rts", fulfillment["id"].as_str().unwrap_or_default())
}

/// Whether the fulfillments recorded as ready to ship carry a pickup time
/// range, combined according to the configured policy. Fulfillments not
/// recorded as ready to ship do not constrain the outcome.
async fn pickup_ranges_provided<'a>(
    ctx: &Context<'_>,
    fulfillments: impl IntoIterator<Item = &'a Value>,
) -> bool {
    let scope = ctx.scope();
    let mut flagged = Vec::new();
    for fulfillment in fulfillments {
        if scope.fetch_str(&rts_key(fulfillment)).await.as_deref() == Some("yes") {
            flagged.push(common::is_present(&fulfillment["start"]["time"]["range"]));
        }
    }
    match ctx.settings.ready_to_ship {
        ReadyToShipPolicy::Every => flagged.iter().all(|ranged| *ranged),
        ReadyToShipPolicy::Any => flagged.is_empty() || flagged.iter().any(|ranged| *ranged),
    }
}

fn delivery_fulfillments(order: &Value) -> impl Iterator<Item = &Value> {
    array(&order["fulfillments"]).iter().filter(|f| is_delivery(f))
}
