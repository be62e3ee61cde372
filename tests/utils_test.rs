use chrono::NaiveDate;
use mdrive::utils::format::{format_currency, format_int, format_km};
use mdrive::utils::time::parse_date;

#[test]
fn test_parse_date_iso() {
    assert_eq!(
        parse_date("2024-01-15"),
        NaiveDate::from_ymd_opt(2024, 1, 15)
    );
}

#[test]
fn test_parse_date_day_first_formats() {
    let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
    assert_eq!(parse_date("15/01/2024"), expected);
    assert_eq!(parse_date("15.01.2024"), expected);
}

#[test]
fn test_parse_date_trims_whitespace() {
    assert_eq!(
        parse_date("  2024-01-15  "),
        NaiveDate::from_ymd_opt(2024, 1, 15)
    );
}

#[test]
fn test_parse_date_invalid() {
    assert_eq!(parse_date("someday"), None);
    assert_eq!(parse_date(""), None);
    assert_eq!(parse_date("2024-13-40"), None);
}

#[test]
fn test_format_int_groups_thousands() {
    assert_eq!(format_int(0), "0");
    assert_eq!(format_int(999), "999");
    assert_eq!(format_int(1000), "1.000");
    assert_eq!(format_int(1234567), "1.234.567");
    assert_eq!(format_int(-50000), "-50.000");
}

#[test]
fn test_format_currency_rounds_to_whole_units() {
    assert_eq!(format_currency(12500.4, "₺"), "12.500 ₺");
    assert_eq!(format_currency(999.6, "€"), "1.000 €");
}

#[test]
fn test_format_km() {
    assert_eq!(format_km(120000), "120.000 KM");
}
