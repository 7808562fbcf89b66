use serde::{Deserialize, Serialize};

/// One open window on a day, in minutes from midnight, half-open [open, close).
/// `close_min` may be 1440 for a block running up to midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBlock {
    pub open_min: u32,
    pub close_min: u32,
}

impl OpenBlock {
    pub fn new(open_min: u32, close_min: u32) -> Self {
        Self { open_min, close_min }
    }
}

/// A bookable window offered to the client. Conflict checking flips
/// `available` instead of removing entries so the UI can gray out taken slots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSlot {
    pub time: String,
    pub end_time: String,
    pub duration: i64,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_name: Option<String>,
}

/// Which system answered an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilitySource {
    Ghl,
    Website,
}

impl AvailabilitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilitySource::Ghl => "ghl",
            AvailabilitySource::Website => "website",
        }
    }
}

impl Serialize for AvailabilitySource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
