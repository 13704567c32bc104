use std::fmt;

use chrono::{DateTime, Local, TimeZone};

/// Format used for journal timestamps, e.g. `2024-03-01 14:05`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a timestamp in the journal's entry date format.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Human-visible state of the draft sync engine.
///
/// Each new status replaces the previous one on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// A save request is in flight.
    Saving,
    /// The draft was saved.
    Saved {
        /// When the server confirmed the save.
        at: DateTime<Local>,
    },
    /// The server deleted the draft because the submitted body was empty.
    Deleted {
        /// When the server confirmed the deletion.
        at: DateTime<Local>,
    },
    /// The last save failed; it is retried on the next tick.
    Error,
}

impl SyncStatus {
    /// Status text shown in the status element.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Saving => "Saving draft…",
            Self::Saved { .. } => "Draft saved",
            Self::Deleted { .. } => "Draft deleted",
            Self::Error => "Error saving draft",
        }
    }

    /// Timestamp text shown next to the status, if any.
    pub fn timestamp(&self) -> Option<String> {
        match self {
            Self::Saved { at } | Self::Deleted { at } => Some(format_timestamp(at)),
            Self::Saving | Self::Error => None,
        }
    }

    /// Returns `true` for the two success states.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved { .. } | Self::Deleted { .. })
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp() {
            Some(ts) => write!(f, "{} at {ts}", self.text()),
            None => f.write_str(self.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap()
    }

    #[test]
    fn timestamp_uses_journal_format() {
        assert_eq!(format_timestamp(&fixed_time()), "2024-03-01 14:05");
    }

    #[test]
    fn saved_and_deleted_are_distinct() {
        let saved = SyncStatus::Saved { at: fixed_time() };
        let deleted = SyncStatus::Deleted { at: fixed_time() };
        assert_ne!(saved.text(), deleted.text());
        assert!(saved.is_success());
        assert!(deleted.is_success());
        assert_eq!(deleted.to_string(), "Draft deleted at 2024-03-01 14:05");
    }

    #[test]
    fn transient_states_have_no_timestamp() {
        assert_eq!(SyncStatus::Saving.timestamp(), None);
        assert_eq!(SyncStatus::Error.to_string(), "Error saving draft");
        assert!(!SyncStatus::Error.is_success());
    }
}
