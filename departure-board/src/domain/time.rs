//! Board time handling.
//!
//! Darwin provides times as "HH:MM" strings in UK local time, but the same
//! fields may instead carry a status word such as "On time", "Delayed" or
//! "Cancelled". Boards never carry a date, so ordering around midnight is
//! done with a rollover rule rather than full date arithmetic.

use chrono::{NaiveTime, Timelike};

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Times before this hour sort after 23:59 on a board.
///
/// A board generated late in the evening lists early-morning services
/// after the late-evening ones, so "00:10" must sort after "23:50".
const ROLLOVER_BEFORE_HOUR: u32 = 2;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time from strict "HH:MM" format.
///
/// # Examples
///
/// ```
/// use departure_board::domain::parse_hhmm;
///
/// assert!(parse_hhmm("00:00").is_ok());
/// assert!(parse_hhmm("23:59").is_ok());
/// assert!(parse_hhmm("On time").is_err());
/// assert!(parse_hhmm("24:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    let bytes = s.as_bytes();

    if bytes.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Whether `s` contains a "DD:DD" token anywhere.
///
/// This is deliberately looser than [`parse_hhmm`]: Darwin sometimes
/// decorates times (for example "12:34*"), and the check only needs to
/// tell a time apart from a status phrase.
pub fn contains_hhmm(s: &str) -> bool {
    s.as_bytes().windows(5).any(|w| {
        w[0].is_ascii_digit()
            && w[1].is_ascii_digit()
            && w[2] == b':'
            && w[3].is_ascii_digit()
            && w[4].is_ascii_digit()
    })
}

/// Minutes elapsed since midnight.
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Ordering key for a scheduled board time.
///
/// Returns minutes since midnight, with 00:00-01:59 shifted forward by a
/// day. Returns `None` if the value does not start with an "HH:MM" time.
///
/// # Examples
///
/// ```
/// use departure_board::domain::board_sort_key;
///
/// assert!(board_sort_key("23:50") < board_sort_key("00:10"));
/// assert_eq!(board_sort_key("01:59"), Some(24 * 60 + 119));
/// assert_eq!(board_sort_key("02:00"), Some(120));
/// assert_eq!(board_sort_key("Delayed"), None);
/// ```
pub fn board_sort_key(s: &str) -> Option<u32> {
    let time = parse_hhmm(s.get(..5)?).ok()?;
    let minutes = minutes_since_midnight(time);

    if time.hour() < ROLLOVER_BEFORE_HOUR {
        Some(minutes + MINUTES_PER_DAY)
    } else {
        Some(minutes)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        let t = parse_hhmm("14:30").unwrap();
        assert_eq!(minutes_since_midnight(t), 14 * 60 + 30);
        assert_eq!(minutes_since_midnight(parse_hhmm("00:00").unwrap()), 0);
    }

    #[test]
    fn reject_malformed_times() {
        assert!(parse_hhmm("1430").is_err());
        assert!(parse_hhmm("14:3").is_err());
        assert!(parse_hhmm("14-30").is_err());
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn contains_time_token() {
        assert!(contains_hhmm("10:15"));
        assert!(contains_hhmm("exp 10:15"));
        assert!(contains_hhmm("10:15*"));
        assert!(!contains_hhmm("On time"));
        assert!(!contains_hhmm("Delayed"));
        assert!(!contains_hhmm("1:15"));
        assert!(!contains_hhmm(""));
    }

    #[test]
    fn sort_key_rolls_over_early_morning() {
        assert_eq!(board_sort_key("00:00"), Some(MINUTES_PER_DAY));
        assert_eq!(board_sort_key("00:10"), Some(MINUTES_PER_DAY + 10));
        assert_eq!(board_sort_key("02:00"), Some(120));
        assert_eq!(board_sort_key("23:59"), Some(23 * 60 + 59));
    }

    #[test]
    fn sort_key_rejects_status_words() {
        assert_eq!(board_sort_key("On time"), None);
        assert_eq!(board_sort_key(""), None);
    }

    #[test]
    fn error_display() {
        let err = parse_hhmm("1430").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: expected HH:MM format");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any well-formed time parses and keeps its minute count.
        #[test]
        fn valid_times_parse(h in 0u32..24, m in 0u32..60) {
            let s = format!("{h:02}:{m:02}");
            let t = parse_hhmm(&s).unwrap();
            prop_assert_eq!(minutes_since_midnight(t), h * 60 + m);
            prop_assert!(contains_hhmm(&s));
        }

        /// Early-morning times always sort after any later-day time.
        #[test]
        fn early_morning_sorts_last(
            early_h in 0u32..2,
            early_m in 0u32..60,
            late_h in 2u32..24,
            late_m in 0u32..60,
        ) {
            let early = board_sort_key(&format!("{early_h:02}:{early_m:02}"));
            let late = board_sort_key(&format!("{late_h:02}:{late_m:02}"));
            prop_assert!(early > late);
        }

        /// Strings without digits never look like times.
        #[test]
        fn letters_never_look_like_times(s in "[A-Za-z ]{0,20}") {
            prop_assert!(!contains_hhmm(&s));
            prop_assert_eq!(board_sort_key(&s), None);
        }
    }
}
