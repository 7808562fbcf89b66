use chrono::NaiveDate;

use crate::domain::models::availability::{BlockedTimeSlot, TimeRange};
use crate::domain::models::booking::Booking;
use crate::domain::models::crm::GhlHourBlock;
use crate::domain::models::slot::{CandidateSlot, OpenBlock};

const SLOT_STEP_MIN: u32 = 60;
const DAY_MINUTES: u32 = 1440;

/// Parses "HH:mm", "H:mm" or "h:mm AM/PM" into minutes from midnight.
/// "24:00" is accepted as the end-of-day boundary.
pub fn parse_time_to_minutes(value: &str) -> Option<u32> {
    let upper = value.trim().to_ascii_uppercase();

    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || minute > 59 {
        return None;
    }

    let hour = match meridiem {
        Some(is_pm) => {
            if hour == 0 || hour > 12 {
                return None;
            }
            let base = hour % 12;
            if is_pm { base + 12 } else { base }
        }
        None => {
            if hour > 24 || (hour == 24 && minute != 0) {
                return None;
            }
            hour
        }
    };

    Some(hour * 60 + minute)
}

/// Formats minutes from midnight as "HH:MM"; 1440 renders as "24:00".
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Active time ranges of a weekday record, as open blocks. Ranges that fail
/// to parse or run backwards are dropped.
pub fn blocks_from_time_ranges(ranges: &[TimeRange]) -> Vec<OpenBlock> {
    ranges
        .iter()
        .filter(|r| r.is_active)
        .filter_map(|r| {
            let open = parse_time_to_minutes(&r.start_time)?;
            let close = parse_time_to_minutes(&r.end_time)?;
            (open < close).then_some(OpenBlock::new(open, close))
        })
        .collect()
}

pub fn blocks_from_ghl_hours(hours: &[GhlHourBlock]) -> Vec<OpenBlock> {
    hours
        .iter()
        .filter_map(|h| {
            let open = h.open_hour * 60 + h.open_minute;
            let close = h.close_hour * 60 + h.close_minute;
            (open < close && close <= DAY_MINUTES).then_some(OpenBlock::new(open, close))
        })
        .collect()
}

/// Emits one candidate per whole-hour step inside each block while the full
/// duration still fits before the block's close. A block shorter than the
/// duration emits nothing. Overlapping candidates are intentional; conflict
/// checking thins them out later.
pub fn generate_slots(blocks: &[OpenBlock], duration_hours: i64) -> Vec<CandidateSlot> {
    if duration_hours <= 0 {
        return Vec::new();
    }
    let duration_min = duration_hours as u32 * 60;

    let mut slots = Vec::new();
    for block in blocks {
        let mut cursor = block.open_min;
        while cursor + duration_min <= block.close_min {
            slots.push(CandidateSlot {
                time: format_minutes(cursor),
                end_time: format_minutes(cursor + duration_min),
                duration: duration_hours,
                available: true,
                artist_id: None,
                artist_name: None,
                calendar_id: None,
                calendar_name: None,
            });
            cursor += SLOT_STEP_MIN;
        }
    }

    slots.sort_by(|a, b| a.time.cmp(&b.time));
    slots.dedup_by(|a, b| a.time == b.time);
    slots
}

/// Flips `available` off for candidates that overlap an active booking's
/// [time, end_time), match a blocked-slot row, or start at or before
/// `now_minutes` when `date` is today. The past-time rule never applies to
/// future dates. Entries are kept so callers can render sold-out slots.
pub fn filter_available(
    slots: &mut [CandidateSlot],
    bookings: &[Booking],
    blocked: &[BlockedTimeSlot],
    date: NaiveDate,
    today: NaiveDate,
    now_minutes: u32,
) {
    for slot in slots.iter_mut() {
        let Some(start) = parse_time_to_minutes(&slot.time) else {
            continue;
        };
        let Some(end) = parse_time_to_minutes(&slot.end_time) else {
            continue;
        };

        if date == today && start <= now_minutes {
            slot.available = false;
            continue;
        }

        let slot_artist = slot.artist_id.as_deref();

        let booked = bookings.iter().any(|b| {
            if !b.is_active() || b.date != date {
                return false;
            }
            if !artists_clash(slot_artist, b.artist_id.as_deref()) {
                return false;
            }
            let (Some(b_start), Some(b_end)) =
                (parse_time_to_minutes(&b.time), parse_time_to_minutes(&b.end_time))
            else {
                return false;
            };
            start < b_end && end > b_start
        });

        if booked {
            slot.available = false;
            continue;
        }

        let blocked_hit = blocked.iter().any(|bl| {
            bl.date == date
                && parse_time_to_minutes(&bl.time) == Some(start)
                && artists_clash(slot_artist, bl.artist_id.as_deref())
        });

        if blocked_hit {
            slot.available = false;
        }
    }
}

// A record with no artist id blocks every candidate, and a candidate with no
// artist id checks against every record; otherwise the ids must match.
fn artists_clash(slot_artist: Option<&str>, other_artist: Option<&str>) -> bool {
    match (slot_artist, other_artist) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Hour marks covered by [start, end), one per blocked-slot row. A partial
/// trailing hour still claims its hour mark.
pub fn covered_hour_marks(start_min: u32, end_min: u32) -> Vec<u32> {
    let mut marks = Vec::new();
    let mut cursor = start_min;
    while cursor < end_min {
        marks.push(cursor);
        cursor += 60;
    }
    marks
}
