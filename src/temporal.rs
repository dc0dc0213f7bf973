//! Temporal classification of incident records.
//!
//! Each record carries free-text date and time fields. Classification tries
//! the two documented formats in order and degrades gracefully: text that
//! resolves to a timestamp at or before `now` is valid and dated, text that
//! resolves strictly into the future is rejected, and anything unparsable is
//! valid but undated (never discarded).
//!
//! `now` is always injected by the caller, never read ambiently, so the
//! classifier is a pure function of `(date, time, now)` and tests can pin it.

use chrono::{Datelike, NaiveDateTime};

/// `DD/MM/YYYY HH:MM:SS`, the primary date-time format.
pub const FULL_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
/// Fixed textual rendering for exported timestamps; lexically sortable.
pub const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Three-way outcome of temporal interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Resolved to a timestamp at or before `now`.
    Dated(NaiveDateTime),
    /// No resolvable timestamp; still eligible, unordered by date.
    Undated,
    /// Resolved strictly after `now`; excluded from the valid set.
    Future,
}

impl Classification {
    /// The resolved timestamp, if any.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Dated(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Whether the record stays in the valid set.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Future)
    }
}

/// Classify a record's date and time text against an injected `now`.
///
/// Formats tried in order, first success wins:
/// 1. `DD/MM/YYYY HH:MM:SS`
/// 2. `DD/MM HH:MM:SS`, the missing year filled from `now`
///
/// Both failing is not an error; the record is simply undated. A yearless
/// `29/02` in a non-leap year also lands here.
pub fn classify(date: &str, time: &str, now: NaiveDateTime) -> Classification {
    let date = date.trim();
    let time = time.trim();

    let resolved = NaiveDateTime::parse_from_str(&format!("{date} {time}"), FULL_FORMAT)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&format!("{date}/{} {time}", now.year()), FULL_FORMAT)
        });

    match resolved {
        Ok(dt) if dt > now => Classification::Future,
        Ok(dt) => Classification::Dated(dt),
        Err(_) => Classification::Undated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2024, 6, 15, 12, 0, 0)
    }

    #[test]
    fn full_format_resolves() {
        let c = classify("01/01/2000", "00:00:00", now());
        assert_eq!(c, Classification::Dated(at(2000, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn yearless_format_fills_current_year() {
        let c = classify("03/02", "09:15:30", now());
        assert_eq!(c, Classification::Dated(at(2024, 2, 3, 9, 15, 30)));
    }

    #[test]
    fn timestamp_equal_to_now_is_valid() {
        let c = classify("15/06/2024", "12:00:00", now());
        assert_eq!(c, Classification::Dated(now()));
    }

    #[test]
    fn one_second_into_the_future_is_rejected() {
        let c = classify("15/06/2024", "12:00:01", now());
        assert_eq!(c, Classification::Future);
        assert!(!c.is_valid());
        assert_eq!(c.timestamp(), None);
    }

    #[test]
    fn next_day_is_rejected() {
        assert_eq!(classify("16/06/2024", "00:00:00", now()), Classification::Future);
    }

    #[test]
    fn yearless_date_can_be_future() {
        // December of the current year is after a mid-June `now`.
        assert_eq!(classify("31/12", "23:59:59", now()), Classification::Future);
    }

    #[test]
    fn blank_fields_are_undated() {
        assert_eq!(classify("", "", now()), Classification::Undated);
        assert_eq!(classify("01/01/2000", "", now()), Classification::Undated);
        assert_eq!(classify("", "10:00:00", now()), Classification::Undated);
    }

    #[test]
    fn unrecognized_text_is_undated_not_an_error() {
        assert_eq!(classify("ayer", "mediodía", now()), Classification::Undated);
        assert_eq!(classify("2024-01-01", "10:00:00", now()), Classification::Undated);
        assert_eq!(classify("32/01/2024", "10:00:00", now()), Classification::Undated);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let c = classify("  01/01/2000  ", " 00:00:00 ", now());
        assert_eq!(c, Classification::Dated(at(2000, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn yearless_leap_day_in_non_leap_year_is_undated() {
        let non_leap_now = at(2023, 6, 15, 12, 0, 0);
        assert_eq!(
            classify("29/02", "10:00:00", non_leap_now),
            Classification::Undated
        );
        // In a leap year the same text resolves.
        assert_eq!(
            classify("29/02", "10:00:00", now()),
            Classification::Dated(at(2024, 2, 29, 10, 0, 0))
        );
    }

    #[test]
    fn classification_depends_only_on_inputs() {
        let a = classify("05/05/2020", "05:05:05", now());
        let b = classify("05/05/2020", "05:05:05", now());
        assert_eq!(a, b);
    }
}
