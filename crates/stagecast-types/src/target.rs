//! Capture target descriptors.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A selectable capture target (one screen or one window).
///
/// Targets are ephemeral: the poller regenerates the list each tick and each
/// tick replaces the client's previous view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TargetInfo {
    pub id: String,
    pub title: String,
}

impl TargetInfo {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Sort a target list into the stable ascending-by-id order clients expect.
pub fn sort_targets(targets: &mut [TargetInfo]) {
    targets.sort_by(|a, b| a.id.cmp(&b.id));
}
