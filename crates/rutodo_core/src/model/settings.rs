//! Display settings and sort-mode vocabulary.
//!
//! # Invariants
//! - Sort modes are stored as their upper-case names for forward
//!   compatibility; unknown names decode to [`SortMode::None`].

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fixed primary key of the single settings row.
pub const SETTINGS_ROW_ID: i64 = 1;

/// Ordering applied to the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortMode {
    /// Ascending by category name.
    Category,
    /// Open tasks before completed ones.
    Completed,
    /// Ascending by title.
    #[default]
    None,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::Category, SortMode::Completed, SortMode::None];

    /// Storage name written to `settings.sortBy`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "CATEGORY",
            Self::Completed => "COMPLETED",
            Self::None => "NONE",
        }
    }

    /// Strict parse of a storage name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CATEGORY" => Some(Self::Category),
            "COMPLETED" => Some(Self::Completed),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    /// Lossy decode used on the read path; unknown names become `None`.
    pub fn from_stored(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            warn!(
                "event=settings_decode module=model status=fallback field=sortBy len={}",
                value.len()
            );
            Self::None
        })
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User display preferences persisted as one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub is_dark_mode: bool,
    pub sort_mode: SortMode,
}

#[cfg(test)]
mod tests {
    use super::{Settings, SortMode};

    #[test]
    fn storage_names_round_trip_for_every_mode() {
        for mode in SortMode::ALL {
            assert_eq!(SortMode::parse(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn unknown_stored_name_falls_back_to_none() {
        assert_eq!(SortMode::parse("PRIORITY"), None);
        assert_eq!(SortMode::from_stored("PRIORITY"), SortMode::None);
        assert_eq!(SortMode::from_stored("category"), SortMode::None);
    }

    #[test]
    fn defaults_are_light_and_unsorted() {
        let settings = Settings::default();
        assert!(!settings.is_dark_mode);
        assert_eq!(settings.sort_mode, SortMode::None);
    }
}
