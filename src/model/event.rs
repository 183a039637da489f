//! event.rs
//! Timestamped work item carrying a relative deadline budget.
//! - created once by the Generator, never mutated afterwards
//! - labeled by the Processor through `with_status`, which yields a new value
//! - serialised for the delivery sink as a flat JSON document

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deadline classification. `Unset` only exists between generation and processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Unset,
    OnTime,
    Late,
}

impl Status {
    pub fn is_unset(&self) -> bool {
        matches!(self, Status::Unset)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Status::Unset => "unset",
            Status::OnTime => "on-time",
            Status::Late => "late",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Budget relative to `created_at`. The wire name predates the unit: the
    /// value is nanoseconds, which the dashboard divides down to milliseconds.
    #[serde(rename = "deadline_ms", with = "duration_nanos")]
    pub deadline: Duration,
    #[serde(default, skip_serializing_if = "Status::is_unset")]
    status: Status,
}

impl Event {
    /// Fresh, unlabeled event stamped with the current wall-clock time.
    pub fn new(deadline: Duration) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            deadline,
            status: Status::Unset,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Labeled copy of this event. Labeling is single-shot: the Processor is
    /// the only caller and it never sees an event twice.
    pub fn with_status(self, status: Status) -> Self {
        debug_assert!(self.status.is_unset(), "event {} labeled twice", self.id);
        debug_assert!(!status.is_unset(), "event {} labeled as unset", self.id);
        Self { status, ..self }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_nanos(u64::deserialize(d)?))
    }
}
