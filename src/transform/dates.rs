// src/transform/dates.rs

use chrono::NaiveDate;

/// Output format for every cleaned date.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Default stamped into date cells that survive every fill step empty.
pub const DEFAULT_DATE: &str = "01-01-2000";

const DAY_FIRST: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%b-%Y", "%d %b %Y"];
const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Flexible date parse. `day_first` controls which family of formats is
/// tried first, mirroring the two parse passes of the pipeline (initial
/// coercion vs. the explicit day-first reformat).
pub fn parse_date(raw: &str, day_first: bool) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }
    // strip a trailing time component if present
    let s = s.split_once(' ').map_or(s, |(d, rest)| {
        if rest.contains(':') {
            d
        } else {
            s
        }
    });

    let (first, second) = if day_first {
        (DAY_FIRST, YEAR_FIRST)
    } else {
        (YEAR_FIRST, DAY_FIRST)
    };
    for fmt in first.iter().chain(second) {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Parse and re-render in the canonical `DD-MM-YYYY` form.
pub fn reformat(raw: &str, day_first: bool) -> Option<String> {
    parse_date(raw, day_first).map(|d| d.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_first_formats_parse() {
        assert_eq!(reformat("02-01-2024", true).as_deref(), Some("02-01-2024"));
        assert_eq!(reformat("2/1/2024", true).as_deref(), Some("02-01-2024"));
        assert_eq!(reformat("02/01/2024", true).as_deref(), Some("02-01-2024"));
        assert_eq!(reformat("05 Mar 2024", true).as_deref(), Some("05-03-2024"));
    }

    #[test]
    fn year_first_formats_parse_either_way() {
        assert_eq!(reformat("2024-01-02", true).as_deref(), Some("02-01-2024"));
        assert_eq!(reformat("2024/01/02", false).as_deref(), Some("02-01-2024"));
    }

    #[test]
    fn trailing_time_is_ignored() {
        assert_eq!(
            reformat("02-01-2024 13:45:00", true).as_deref(),
            Some("02-01-2024")
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date("not a date", true), None);
        assert_eq!(parse_date("", true), None);
    }
}
