use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Storage format of booking dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of booking times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Hours offered on the user-facing time grid: 08:00 through 23:00, then 00:00 and 01:00.
pub fn booking_grid() -> Vec<String> {
    (8..24)
        .chain(0..2)
        .map(|hour| format!("{hour:02}:00"))
        .collect()
}

/// Date and time strings of `now` shifted by `minutes`.
pub fn offset_from(now: NaiveDateTime, minutes: i64) -> (String, String) {
    let at = now + Duration::minutes(minutes);
    (
        at.format(DATE_FORMAT).to_string(),
        at.format(TIME_FORMAT).to_string(),
    )
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `2024-03-07` → `07.03`; unparseable input is returned unchanged.
pub fn short_date(stored: &str) -> String {
    NaiveDate::parse_from_str(stored, DATE_FORMAT)
        .map(|d| d.format("%d.%m").to_string())
        .unwrap_or_else(|_| stored.to_string())
}

/// `2024-03-07` → `07.03.2024`; unparseable input is returned unchanged.
pub fn long_date(stored: &str) -> String {
    NaiveDate::parse_from_str(stored, DATE_FORMAT)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|_| stored.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_booking_grid_shape() {
        let grid = booking_grid();
        assert_eq!(grid.len(), 18);
        assert_eq!(grid.first().map(String::as_str), Some("08:00"));
        assert_eq!(grid[15], "23:00");
        assert_eq!(&grid[16..], ["00:00", "01:00"]);
    }

    #[test]
    fn test_offset_rolls_over_midnight() {
        let (date, time) = offset_from(at("2024-12-31", "23:50"), 15);
        assert_eq!(date, "2025-01-01");
        assert_eq!(time, "00:05");
    }

    #[test]
    fn test_offset_within_day() {
        let (date, time) = offset_from(at("2024-05-10", "10:30"), 60);
        assert_eq!(date, "2024-05-10");
        assert_eq!(time, "11:30");
    }

    #[test]
    fn test_display_dates() {
        assert_eq!(short_date("2024-03-07"), "07.03");
        assert_eq!(long_date("2024-03-07"), "07.03.2024");
        assert_eq!(short_date("soon"), "soon");
    }
}
