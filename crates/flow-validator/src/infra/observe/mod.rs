//! Observability for the validator. Each function represents an event that is
//! meaningful to an operator and is called where that event happens.

use {
    crate::domain::{Action, dispatch, report::Report, state},
    std::fmt::Display,
};

pub mod tracing;

/// Setup the observability. `log` is the tracing filter.
pub fn init(log: &str, json: bool) {
    self::tracing::initialize(log, json);
}

/// Observe that a validation run started.
pub fn validating(session: &str, flows: usize) {
    ::tracing::info!(%session, flows, "validating session");
}

/// Observe that the session's domain and version could not be resolved.
pub fn session_unresolved(session: &str, err: &anyhow::Error) {
    ::tracing::warn!(%session, ?err, "failed to resolve session details");
}

/// Observe that nothing is configured for a domain/version.
pub fn missing_config(domain: &str, version: &str) {
    ::tracing::warn!(%domain, %version, "no flow configuration for domain and version");
}

/// Observe configured flows that the session did not test.
pub fn mandatory_flows_missing(session: &str, flows: &[&str]) {
    ::tracing::info!(%session, ?flows, "mandatory flows were not tested");
}

/// Observe a flow whose actions diverge from the configured sequence.
pub fn sequence_mismatch(flow: &str, error: &str) {
    ::tracing::info!(%flow, %error, "flow sequence mismatch");
}

/// Observe a flow whose configured sequence is unusable.
pub fn malformed_sequence(flow: &str) {
    ::tracing::warn!(%flow, "flow sequence is not a list of actions, skipping sequence check");
}

/// Observe a flow that has no configured sequence.
pub fn unconfigured_flow(flow: &str) {
    ::tracing::debug!(%flow, "flow has no configured sequence");
}

/// Observe a message whose action token is not a protocol action.
pub fn unknown_action(flow: &str, index: usize, token: &str) {
    ::tracing::debug!(%flow, index, %token, "skipping message with unknown action");
}

/// Observe that a message could not be dispatched to a rule.
pub fn dispatch_failed(flow: &str, action: Action, index: usize, err: &dispatch::Error) {
    ::tracing::error!(%flow, %action, index, ?err, "failed to dispatch message");
}

/// Observe that reading cross-message state failed.
pub fn state_unavailable(key: &state::Key, err: &state::Error) {
    ::tracing::warn!(%key, ?err, "state read failed, treating value as absent");
}

/// Observe that writing cross-message state failed.
pub fn state_write_dropped(key: &str, err: &state::Error) {
    ::tracing::warn!(%key, ?err, "state write failed");
}

/// Observe that the payloads of a flow could not be fetched.
pub fn payload_fetch_failed(flow: &str, err: &impl Display) {
    ::tracing::warn!(%flow, %err, "failed to fetch payloads, validating flow without messages");
}

/// Observe a finished validation run.
pub fn validated(session: &str, report: &Report) {
    let invalid = report
        .flow_errors
        .values()
        .filter(|flow| !flow.valid_flow)
        .count();
    ::tracing::info!(
        %session,
        flows = report.flow_errors.len(),
        invalid,
        mandatory = ?report.final_report.mandatory_flows,
        "validated session"
    );
}
