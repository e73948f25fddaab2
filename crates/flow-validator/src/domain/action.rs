use serde::{Deserialize, Serialize};

/// A protocol action. Every captured message carries exactly one of these
/// tokens in its `action` field.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Search,
    OnSearch,
    Select,
    OnSelect,
    Init,
    OnInit,
    Confirm,
    OnConfirm,
    Cancel,
    OnCancel,
    Update,
    OnUpdate,
    Status,
    OnStatus,
    Track,
    OnTrack,
}

impl Action {
    /// Parses a raw action token as it appears in captured payloads. Tokens
    /// are matched case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        token.to_lowercase().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, strum::IntoEnumIterator};

    #[test]
    fn parses_tokens_case_insensitively() {
        assert_eq!(Action::parse("on_search"), Some(Action::OnSearch));
        assert_eq!(Action::parse("ON_CONFIRM"), Some(Action::OnConfirm));
        assert_eq!(Action::parse("Track"), Some(Action::Track));
        assert_eq!(Action::parse("on_issue"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn display_matches_wire_token() {
        for action in Action::iter() {
            assert_eq!(Action::parse(&action.to_string()), Some(action));
        }
        assert_eq!(Action::OnStatus.to_string(), "on_status");
        assert_eq!(Action::iter().count(), 16);
    }
}
