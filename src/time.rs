use chrono::{NaiveTime, Timelike};

use crate::error::{PlannerError, PlannerResult};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parse a strict 24-hour `HH:MM` string (zero-padded, no seconds).
pub fn parse_hhmm(raw: &str) -> PlannerResult<NaiveTime> {
    let value = raw.trim();
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);
    if !well_formed {
        return Err(PlannerError::invalid(format!(
            "time '{raw}' must be in HH:MM format"
        )));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| PlannerError::invalid(format!("time '{raw}' is not a valid time of day")))
}

pub fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Convert a minute offset back into a time of day. Offsets at or past
/// midnight of the next day have no time-of-day and yield `None`.
pub fn time_from_minutes(minutes: i64) -> Option<NaiveTime> {
    if !(0..MINUTES_PER_DAY).contains(&minutes) {
        return None;
    }
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
pub fn intervals_overlap(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    !(a_end <= b_start || b_end <= a_start)
}
