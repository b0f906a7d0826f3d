use chrono::{DateTime, Local, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

lazy_static! {
    static ref SLOT_TIME_RE: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Canceled,
    Blocked,
}

impl AppointmentStatus {
    /// Whether an appointment in this status reserves its slot against new
    /// bookings. Canceled records are treated as if absent.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Completed | Self::Blocked)
    }

    /// Listing order used by the store: blocked, scheduled, completed,
    /// canceled.
    pub fn list_rank(&self) -> u8 {
        match self {
            Self::Blocked => 0,
            Self::Scheduled => 1,
            Self::Completed => 2,
            Self::Canceled => 3,
        }
    }

    pub fn is_history(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("Unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub service: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBlock {
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One day's appointment records plus the day-level block, as returned by
/// the store's list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub items: Vec<Appointment>,
    pub day_block: Option<DayBlock>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client_name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub service: Option<String>,
}

/// Partial update applied through the store. `None` leaves a field
/// unchanged; `service: Some("")` clears the service label.
#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub client_name: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.phone.is_none()
            && self.service.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.status.is_none()
    }

    /// Whether applying this update puts the record into a slot it did not
    /// already hold: it moves, or it comes back from canceled. Completing or
    /// editing a record where it stands is not a new booking, so it passes a
    /// day block added after the fact.
    pub fn creates_new_occupancy(&self, current_status: AppointmentStatus) -> bool {
        let target_status = self.status.unwrap_or(current_status);
        if !target_status.occupies_slot() {
            return false;
        }
        self.date.is_some()
            || self.time.is_some()
            || current_status == AppointmentStatus::Canceled
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Listing order used by the store: status rank, then date, time and
/// creation order.
pub fn sort_for_listing(items: &mut [Appointment]) {
    items.sort_by(|a, b| {
        (a.status.list_rank(), a.date, &a.time, a.created_at).cmp(&(
            b.status.list_rank(),
            b.date,
            &b.time,
            b.created_at,
        ))
    });
}

/// Canonical phone formatting: strip everything but digits, group 11-digit
/// numbers as `(DD) NNNNN-NNNN` and 10-digit ones as `(DD) NNNN-NNNN`.
/// Anything else passes through as the bare digit string.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => digits,
    }
}

/// Accepts ISO dates plus the day-first and dotted/slashed variants clients
/// send, normalized to a `NaiveDate`. Bare 8-digit input is tried day-first,
/// then year-first.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        for format in ["%d%m%Y", "%Y%m%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return Some(date);
            }
        }
        return None;
    }
    for format in [
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%Y/%m/%d",
        "%Y.%m.%d",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

/// Slot times are "HH:MM" strings; the store rejects anything else before
/// it reaches a conflict check.
pub fn is_slot_time(raw: &str) -> bool {
    SLOT_TIME_RE.is_match(raw)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_phone_groups_eleven_digits() {
        assert_eq!(normalize_phone("27998099941"), "(27) 99809-9941");
        assert_eq!(normalize_phone("(27) 99809-9941"), "(27) 99809-9941");
    }

    #[test]
    fn normalize_phone_groups_ten_digits() {
        assert_eq!(normalize_phone("2738221234"), "(27) 3822-1234");
    }

    #[test]
    fn normalize_phone_passes_other_lengths_through() {
        assert_eq!(normalize_phone("123"), "123");
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test_case::test_case("2026-08-07" ; "iso_dash")]
    #[test_case::test_case("07/08/2026" ; "dmy_slash")]
    #[test_case::test_case("07-08-2026" ; "dmy_dash")]
    #[test_case::test_case("07.08.2026" ; "dmy_dot")]
    #[test_case::test_case("2026/08/07" ; "ymd_slash")]
    #[test_case::test_case("2026.08.07" ; "ymd_dot")]
    #[test_case::test_case("07082026" ; "dmy_bare")]
    #[test_case::test_case(" 2026-08-07 " ; "iso_dash_padded")]
    fn parse_flexible_date_accepts_known_formats(raw: &str) {
        let expected = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(parse_flexible_date(raw), Some(expected));
    }

    #[test]
    fn parse_flexible_date_prefers_day_first_for_bare_digits() {
        // 01022026 is ambiguous; day-first wins.
        let expected = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(parse_flexible_date("01022026"), Some(expected));
        let year_first = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(parse_flexible_date("20260807"), Some(year_first));
    }

    #[test_case::test_case("")]
    #[test_case::test_case("tomorrow")]
    #[test_case::test_case("2026-13-01")]
    #[test_case::test_case("32/01/2026")]
    #[test_case::test_case("123456789")]
    fn parse_flexible_date_rejects_garbage(raw: &str) {
        assert_eq!(parse_flexible_date(raw), None);
    }

    #[test]
    fn slot_time_format() {
        assert!(is_slot_time("09:00"));
        assert!(is_slot_time("20:00"));
        assert!(is_slot_time("23:59"));
        assert!(!is_slot_time("9:00"));
        assert!(!is_slot_time("24:00"));
        assert!(!is_slot_time("09:60"));
        assert!(!is_slot_time("09:00:00"));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Canceled,
            AppointmentStatus::Blocked,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("booked".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn canceled_does_not_occupy() {
        assert!(!AppointmentStatus::Canceled.occupies_slot());
        assert!(AppointmentStatus::Scheduled.occupies_slot());
        assert!(AppointmentStatus::Completed.occupies_slot());
        assert!(AppointmentStatus::Blocked.occupies_slot());
    }
}
