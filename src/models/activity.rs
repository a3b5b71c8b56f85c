//! Activity model
//!
//! This module defines the Activity entity (a weekly recurrence template)
//! and the types derived from it: the closed `Weekday` set, the mutation
//! draft, and the on-demand `Occurrence` projection.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day-of-week label for a recurrence template.
///
/// A closed set: anything outside these seven labels is rejected at write
/// time rather than stored and silently skipped later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in calendar order, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// The canonical label, as stored and compared.
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Days since Sunday (Sunday=0 .. Saturday=6), the index used by the
    /// occurrence projection.
    pub fn days_from_sunday(&self) -> i64 {
        i64::from(self.to_chrono().num_days_from_sunday())
    }

    /// Convert to the chrono weekday type.
    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monday" => Ok(Weekday::Monday),
            "Tuesday" => Ok(Weekday::Tuesday),
            "Wednesday" => Ok(Weekday::Wednesday),
            "Thursday" => Ok(Weekday::Thursday),
            "Friday" => Ok(Weekday::Friday),
            "Saturday" => Ok(Weekday::Saturday),
            "Sunday" => Ok(Weekday::Sunday),
            other => Err(UnknownWeekday(other.to_string())),
        }
    }
}

/// Error returned when a day-of-week label is not one of the seven known ones.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown day of week: {0}")]
pub struct UnknownWeekday(pub String);

/// Activity entity: a perpetual weekly recurrence template.
///
/// There is no calendar date on an Activity; concrete dates only exist on
/// the derived [`Occurrence`]. The tuple `(title, day_of_week, start_hour,
/// end_hour)` is the uniqueness key among templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    /// Unique identifier, assigned by the store
    pub id: i64,
    /// Activity title
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    /// Weekday the activity recurs on
    pub day_of_week: Weekday,
    /// Wall-clock start time, `HH:MM` 24-hour form
    pub start_hour: String,
    /// Wall-clock end time, `HH:MM` 24-hour form
    pub end_hour: String,
    /// Where the activity takes place
    pub location: Option<String>,
    /// Who runs the activity
    pub instructor: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Create a new Activity from a validated draft.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(draft: &ActivityDraft, day_of_week: Weekday) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            title: draft.title.clone(),
            description: draft.description.clone(),
            day_of_week,
            start_hour: draft.start_hour.clone(),
            end_hour: draft.end_hour.clone(),
            location: draft.location.clone(),
            instructor: draft.instructor.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether this activity carries the same dedup tuple as another.
    pub fn same_slot(&self, other: &Activity) -> bool {
        self.title == other.title
            && self.day_of_week == other.day_of_week
            && self.start_hour == other.start_hour
            && self.end_hour == other.end_hour
    }
}

/// Proposed field values for creating or replacing an Activity.
///
/// `day_of_week` stays a plain string here; the mutation gate parses and
/// validates it so a bad label surfaces as an input error, not a serde
/// rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityDraft {
    /// Activity title (required)
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Weekday label, one of Monday..Sunday (required)
    pub day_of_week: String,
    /// Start time, `HH:MM` (required)
    pub start_hour: String,
    /// End time, `HH:MM` (required)
    pub end_hour: String,
    /// Where the activity takes place
    #[serde(default)]
    pub location: Option<String>,
    /// Who runs the activity
    #[serde(default)]
    pub instructor: Option<String>,
}

/// A concrete, dated instance of an Activity.
///
/// Derived on demand from the template set and a reference instant; never
/// persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Occurrence {
    /// The recurrence template this instance comes from
    pub activity: Activity,
    /// When this instance starts, in the deployment's canonical timezone
    pub starts_at: DateTime<FixedOffset>,
}

/// Parse a `HH:MM` 24-hour wall-clock string into `(hour, minute)`.
///
/// Both fields must be exactly two digits; hour 00..23, minute 00..59.
pub fn parse_hhmm(value: &str) -> Option<(u32, u32)> {
    let (h, m) = value.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}
