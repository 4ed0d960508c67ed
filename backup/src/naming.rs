//! File-name templating for the three artifact kinds the pipeline moves:
//! day-log, compressed day-log, counter file. Mirrors the `{year}-{month}-
//! {day}` templating in `python_poc/backup_procem_data.py`, but matches the
//! fixed `YYYY-MM-DD` format `hub::dayfile` actually writes rather than
//! the original's configurable `date_format`, since the two must agree.

use chrono::NaiveDate;

pub fn day_log_name(date: NaiveDate) -> String {
    format!("{}_procem.csv", date.format("%Y-%m-%d"))
}

pub fn counter_name(date: NaiveDate) -> String {
    format!("{}_data_counter.csv", date.format("%Y-%m-%d"))
}

pub fn compressed_name(date: NaiveDate, extension: &str) -> String {
    format!("{}_procem.{extension}", date.format("%Y-%m-%d"))
}

/// Extracts the `NaiveDate` encoded in a day-log, counter, or compressed
/// day-log file name, or `None` if the name doesn't match the
/// `YYYY-MM-DD_...` pattern.
#[must_use]
pub fn date_from_name(name: &str) -> Option<NaiveDate> {
    let prefix = name.get(0..10)?;
    if name.as_bytes().get(10) != Some(&b'_') {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_round_trip_through_date_from_name() {
        let d = date(2024, 3, 7);
        assert_eq!(date_from_name(&day_log_name(d)), Some(d));
        assert_eq!(date_from_name(&counter_name(d)), Some(d));
        assert_eq!(date_from_name(&compressed_name(d, "7z")), Some(d));
    }

    #[test]
    fn rejects_names_without_the_expected_prefix() {
        assert_eq!(date_from_name("not_a_date_procem.csv"), None);
        assert_eq!(date_from_name("2024-03-07procem.csv"), None);
    }
}
