//! Damage-state variant selection.
//!
//! Maps a three-state hp label onto one of a class's multiplexed mesh
//! stops. This is a fixed lookup by position in the threshold-ascending
//! list; it never compares against a live HP value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-state damage label used by scene descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HpState {
    #[default]
    Normal,
    Damaged,
    Critical,
}

impl HpState {
    /// Lenient parse: anything other than `damaged`/`critical` is normal
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("damaged") => HpState::Damaged,
            Some("critical") => HpState::Critical,
            _ => HpState::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HpState::Normal => "normal",
            HpState::Damaged => "damaged",
            HpState::Critical => "critical",
        }
    }
}

impl fmt::Display for HpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index into a threshold-ascending list of `len` variants.
///
/// - `critical` -> lowest threshold
/// - `normal` -> highest threshold
/// - `damaged` -> second-highest when there are 3 or more, lowest when there are exactly 2
pub fn variant_index(len: usize, state: HpState) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = match state {
        HpState::Critical => 0,
        HpState::Normal => len - 1,
        HpState::Damaged if len >= 3 => len - 2,
        HpState::Damaged if len == 2 => 0,
        HpState::Damaged => len - 1,
    };
    Some(index)
}

/// Pick the variant for `state` from a threshold-ascending list
pub fn select_variant<T>(ascending: &[T], state: HpState) -> Option<&T> {
    variant_index(ascending.len(), state).and_then(|i| ascending.get(i))
}
