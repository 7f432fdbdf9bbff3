//! Reference-month parsing for Portuguese bill headers.

use chrono::{Datelike, NaiveDate};

/// Portuguese month tokens, abbreviated and in full.
const MONTHS: [(&str, u32); 25] = [
    ("JAN", 1),
    ("FEV", 2),
    ("MAR", 3),
    ("ABR", 4),
    ("MAI", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AGO", 8),
    ("SET", 9),
    ("OUT", 10),
    ("NOV", 11),
    ("DEZ", 12),
    ("JANEIRO", 1),
    ("FEVEREIRO", 2),
    ("MARÇO", 3),
    ("MARCO", 3),
    ("ABRIL", 4),
    ("MAIO", 5),
    ("JUNHO", 6),
    ("JULHO", 7),
    ("AGOSTO", 8),
    ("SETEMBRO", 9),
    ("OUTUBRO", 10),
    ("NOVEMBRO", 11),
    ("DEZEMBRO", 12),
];

/// Month number (1-12) for a Portuguese month token, case-insensitive.
pub fn month_number(token: &str) -> Option<u32> {
    let upper = token.trim().to_uppercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, number)| *number)
}

/// Build the first day of the month named by `month` in `year`.
///
/// Returns `None` for unknown month tokens or a non-integer year.
pub fn parse_month_year(month: &str, year: &str) -> Option<NaiveDate> {
    let month = month_number(month)?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Format as the bill prints it, e.g. "JAN/2024".
pub fn format_reference_month(date: NaiveDate) -> String {
    let abbreviation = MONTHS[(date.month0()) as usize].0;
    format!("{}/{}", abbreviation, date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_year() {
        assert_eq!(
            parse_month_year("JAN", "2024"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_month_year("dez", "2023"),
            NaiveDate::from_ymd_opt(2023, 12, 1)
        );
        assert_eq!(
            parse_month_year("Março", "2024"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_month_year_rejects_unknown() {
        assert_eq!(parse_month_year("XYZ", "2024"), None);
        assert_eq!(parse_month_year("JAN", "20x4"), None);
    }

    #[test]
    fn test_format_reference_month() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(format_reference_month(date), "SET/2024");
    }
}
