//! Capture times embedded in platform file names.

use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const COMPACT: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day][hour][minute][second]");

/// Parses `YYYYMMDDHHMMSS`.
pub fn parse_compact(digits: &str) -> Option<PrimitiveDateTime> {
    if digits.len() != 14 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    PrimitiveDateTime::parse(digits, COMPACT).ok()
}

/// Parses a two-digit-year date (`YYMMDD`) and a time (`HHMMSS`).
///
/// Years `69`-`99` land in the 1900s, everything else in the 2000s.
pub fn parse_short_year(yymmdd: &str, hhmmss: &str) -> Option<PrimitiveDateTime> {
    let year: u8 = yymmdd.get(..2)?.parse().ok()?;
    let century = if year >= 69 { "19" } else { "20" };
    parse_compact(&format!("{century}{yymmdd}{hhmmss}"))
}

/// Destination file name for a parsed capture time.
pub fn destination_name(datetime: PrimitiveDateTime, extension: &str) -> Option<String> {
    gsm_games::format_datetime(datetime).ok().map(|stem| format!("{stem}{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    #[case("20240229134500", Some(datetime!(2024-02-29 13:45:00)))]
    #[case("20230230134500", None)]
    #[case("2024022913450", None)]
    #[case("2024-2-29134500", None)]
    #[case("20240229134599", None)]
    fn test_parse_compact(#[case] input: &str, #[case] expected: Option<PrimitiveDateTime>) {
        assert_eq!(parse_compact(input), expected);
    }

    #[rstest]
    #[case("210315", "204512", Some(datetime!(2021-03-15 20:45:12)))]
    #[case("991231", "235959", Some(datetime!(1999-12-31 23:59:59)))]
    #[case("21031", "204512", None)]
    #[case("xx0315", "204512", None)]
    fn test_parse_short_year(#[case] date: &str, #[case] clock: &str, #[case] expected: Option<PrimitiveDateTime>) {
        assert_eq!(parse_short_year(date, clock), expected);
    }

    #[test]
    fn test_destination_name() {
        let name = destination_name(datetime!(2021-03-15 20:45:12), ".jpg").unwrap();
        assert_eq!(name, "2021-03-15_20-45-12.jpg");
    }
}
