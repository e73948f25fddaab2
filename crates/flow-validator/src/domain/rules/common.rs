//! Predicates and payload accessors shared by the rule catalogs.

use {
    crate::domain::message::parse_timestamp,
    chrono::{DateTime, Duration, NaiveDate, Utc},
    regex::Regex,
    rust_decimal::Decimal,
    serde_json::Value,
    std::{str::FromStr, sync::LazyLock},
};

/// Flow ids that switch on flow-specific checks.
pub mod flows {
    pub const CASH_ON_DELIVERY: &str = "CASH_ON_DELIVERY_FLOW";
    pub const PREPAID_PAYMENT: &str = "PREPAID_PAYMENT_FLOW";
    pub const WEIGHT_DIFFERENTIAL: &str = "WEIGHT_DIFFERENTIAL_FLOW";
    pub const PICKUP_DELIVERY_ATTEMPT: &str = "PICKUP_DELIVERY_ATTEMPT";
    pub const USER_CANCELLATION: &str = "USER_CANCELLATION_FLOW";
    pub const TECHNICAL_CANCELLATION: &str = "TECHNICAL_CANCELLATION_FLOW";
    pub const DELAYED_CANCEL_REJECTED: &str = "DELAYED_CANCEL_REJECTED_FLOW";
    pub const DELAYED_CANCEL_ACCEPTED: &str = "DELAYED_CANCEL_ACCEPTED_FLOW";
    pub const DELAYED_CANCELLATION: &str = "DELAYED_CANCELLATION_FLOW";
}

pub const BUYER_CANCEL_CODES: [&str; 5] = ["001", "002", "003", "004", "005"];

/// Fulfillment states reached once the shipment left the pickup location.
pub const STATES_AFTER_PICKUP: [&str; 6] = [
    "Order-picked-up",
    "In-transit",
    "At-destination-hub",
    "At-delivery",
    "Delivery-rescheduled",
    "Order-delivered",
];

/// Feature code a provider publishes for each flow that exercises a feature.
const FEATURE_CODES: [(&str, &str); 4] = [
    (flows::CASH_ON_DELIVERY, "008"),
    (flows::PREPAID_PAYMENT, "00D"),
    (flows::WEIGHT_DIFFERENTIAL, "021"),
    (flows::PICKUP_DELIVERY_ATTEMPT, "00E"),
];

/// Flows whose features the logistics provider must publish in its catalog.
pub const LSP_FEATURE_FLOWS: [&str; 4] = [
    flows::CASH_ON_DELIVERY,
    flows::PREPAID_PAYMENT,
    flows::WEIGHT_DIFFERENTIAL,
    flows::PICKUP_DELIVERY_ATTEMPT,
];

/// Flows whose features the buyer app must request in its search intent.
pub const LBNP_FEATURE_FLOWS: [&str; 2] = [flows::WEIGHT_DIFFERENTIAL, flows::PICKUP_DELIVERY_ATTEMPT];

/// The elements of a JSON array, or nothing.
pub fn array(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Whether a JSON value counts as provided: not null, false, zero or empty
/// string.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(string) => !string.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The first tag with the given code in a tag array.
pub fn tag<'a>(tags: &'a Value, code: &str) -> Option<&'a Value> {
    array(tags).iter().find(|tag| tag["code"] == code)
}

/// All tags with the given code in a tag array.
pub fn tags<'a>(tags: &'a Value, code: &'a str) -> impl Iterator<Item = &'a Value> {
    array(tags).iter().filter(move |tag| tag["code"] == code)
}

/// The value of the first entry of a tag's list with the given code.
pub fn list_value<'a>(tag: &'a Value, code: &str) -> Option<&'a str> {
    array(&tag["list"])
        .iter()
        .find(|entry| entry["code"] == code)
        .and_then(|entry| entry["value"].as_str())
}

/// Whether a tag's list holds `code` with `value`, comparing the value
/// case-insensitively.
pub fn has_list_entry(tag: &Value, code: &str, value: &str) -> bool {
    array(&tag["list"]).iter().any(|entry| {
        entry["code"] == code
            && entry["value"]
                .as_str()
                .is_some_and(|actual| actual.eq_ignore_ascii_case(value))
    })
}

/// Whether the published feature tag covers the feature of `flow`. Flows
/// without a feature are trivially covered.
pub fn features_published(flow: &str, tags: &Value, feature_tag: &str) -> bool {
    let mut required = FEATURE_CODES
        .iter()
        .filter(|(feature_flow, _)| *feature_flow == flow)
        .map(|(_, code)| *code)
        .peekable();
    if required.peek().is_none() {
        return true;
    }
    let Some(features) = tag(tags, feature_tag) else {
        return false;
    };
    if !features["list"].is_array() {
        return false;
    }
    required.all(|code| has_list_entry(features, code, "yes"))
}

/// Whether a decimal string has at most two digits after the point.
///
/// Strings that do not consist of exactly one integer and one fractional
/// part are not constrained.
pub fn has_two_or_less_decimal_places(value: &str) -> bool {
    match value.split_once('.') {
        Some((_, fraction)) if !fraction.contains('.') => fraction.len() <= 2,
        _ => true,
    }
}

/// A decimal held in a JSON string or number.
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
}

/// The string form of a price value, whether it is a JSON string or number.
pub fn raw_number(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => Some(raw.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn timestamp_at(value: &Value, pointer: &str) -> Option<DateTime<Utc>> {
    value.pointer(pointer).and_then(parse_timestamp)
}

/// Whether `value` is known and not later than the known `reference`.
pub fn not_later(value: Option<DateTime<Utc>>, reference: Option<DateTime<Utc>>) -> bool {
    matches!((value, reference), (Some(value), Some(reference)) if value <= reference)
}

/// The UTC calendar day of a date or timestamp string.
pub fn day(value: &Value) -> Option<NaiveDate> {
    parse_timestamp(value)
        .map(|timestamp| timestamp.date_naive())
        .or_else(|| {
            value
                .as_str()
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        })
}

/// Whether `day` falls on a later UTC calendar day than `reference`.
pub fn is_later_day(day: NaiveDate, reference: DateTime<Utc>) -> bool {
    day > reference.date_naive()
}

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap()
});

/// Parses the day/time subset of ISO 8601 durations, e.g. `P4D` or `PT12H`.
pub fn iso_duration(raw: &str) -> Option<Duration> {
    let captures = ISO_DURATION.captures(raw)?;
    let part = |i: usize| -> Option<i64> {
        captures
            .get(i)
            .map_or(Some(0), |part| part.as_str().parse().ok())
    };
    Duration::try_days(part(1)?)?
        .checked_add(&Duration::try_hours(part(2)?)?)?
        .checked_add(&Duration::try_minutes(part(3)?)?)?
        .checked_add(&Duration::try_seconds(part(4)?)?)
}

/// The `YYYY-MM-DD` day reached `duration` after `start`.
pub fn date_after(start: DateTime<Utc>, duration: &Value) -> Option<String> {
    let duration = iso_duration(duration.as_str()?)?;
    start
        .checked_add_signed(duration)
        .map(|end| end.format("%Y-%m-%d").to_string())
}
