//! Rules for the legacy logistics domain (nic2004:60232).

use {
    super::{
        RuleSet,
        logistics::{Init, OnSearch, OnUpdate, Profile, Search},
    },
    crate::domain::Action,
};

mod on_track;

pub use on_track::OnTrack;

pub const LOCATOR: &str = "logistics-legacy";

pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(Action::Search, Search(Profile::Legacy))
        .with(Action::OnSearch, OnSearch(Profile::Legacy))
        .with(Action::Init, Init(Profile::Legacy))
        .with(Action::OnUpdate, OnUpdate(Profile::Legacy))
        .with(Action::OnTrack, OnTrack)
        .rest_unchecked()
}
