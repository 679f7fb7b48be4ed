//! Wire types for the Activity Service catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One club/event offering as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

impl Activity {
    /// Remaining capacity as shown on the card. The service is trusted
    /// to keep this non-negative; display saturates rather than going
    /// negative on bad data.
    pub fn spots_left(&self) -> u32 {
        self.max_participants
            .saturating_sub(self.participants.len() as u32)
    }
}

/// Full catalog keyed by activity name, received wholesale on every
/// fetch and never mutated locally. BTreeMap keeps card and select
/// option order stable across renders.
pub type ActivityCatalog = BTreeMap<String, Activity>;
