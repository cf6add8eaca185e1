use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of the `YYYY-MM-DD-HH:MM` token.
const SLOT_ID_LEN: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotIdError {
    #[error("Slot must match YYYY-MM-DD-HH:MM")]
    Malformed,
    #[error("Slot names a date that does not exist")]
    InvalidDate,
    #[error("Slot names a time that does not exist")]
    InvalidTime,
}

/// One bookable half-hour on one date, serialized as `YYYY-MM-DD-HH:MM`.
///
/// Parsing is strict: every digit position is fixed, so two identifiers are
/// equal exactly when their string forms are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotId {
    date: NaiveDate,
    time: NaiveTime,
}

impl SlotId {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Time of day as fractional hours, e.g. 14:30 -> 14.5.
    pub fn hour_decimal(&self) -> f64 {
        self.time.hour() as f64 + self.time.minute() as f64 / 60.0
    }

    /// `HH:MM` part of the identifier.
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

impl FromStr for SlotId {
    type Err = SlotIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bytes = raw.as_bytes();
        if bytes.len() != SLOT_ID_LEN {
            return Err(SlotIdError::Malformed);
        }

        for (idx, b) in bytes.iter().enumerate() {
            let ok = match idx {
                4 | 7 | 10 => *b == b'-',
                13 => *b == b':',
                _ => b.is_ascii_digit(),
            };
            if !ok {
                return Err(SlotIdError::Malformed);
            }
        }

        // Every position was checked above, so these slices are ASCII digits.
        let num = |range: std::ops::Range<usize>| -> u32 {
            raw[range].parse().unwrap_or(u32::MAX)
        };

        let date = NaiveDate::from_ymd_opt(num(0..4) as i32, num(5..7), num(8..10))
            .ok_or(SlotIdError::InvalidDate)?;
        let time = NaiveTime::from_hms_opt(num(11..13), num(14..16), 0)
            .ok_or(SlotIdError::InvalidTime)?;

        Ok(Self { date, time })
    }
}

impl TryFrom<String> for SlotId {
    type Error = SlotIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotId> for String {
    fn from(slot: SlotId) -> Self {
        slot.to_string()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"))
    }
}

/// How the requester wants to be reached.
///
/// Phone and video draw from the windowed volunteer roster; chat draws from
/// the youth roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Phone,
    Video,
    #[serde(alias = "discord")]
    Chat,
}

impl ContactMethod {
    pub fn pool(&self) -> RosterPool {
        match self {
            ContactMethod::Phone | ContactMethod::Video => RosterPool::Volunteer,
            ContactMethod::Chat => RosterPool::Youth,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactMethod::Phone => "phone",
            ContactMethod::Video => "video",
            ContactMethod::Chat => "chat",
        }
    }
}

impl FromStr for ContactMethod {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(ContactMethod::Phone),
            "video" => Ok(ContactMethod::Video),
            "chat" | "discord" => Ok(ContactMethod::Chat),
            _ => Err(()),
        }
    }
}

/// Which roster a booking's assignee comes from. Assignment counts and
/// double-booking checks never cross pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterPool {
    Volunteer,
    Youth,
}
