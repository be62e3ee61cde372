use chrono::NaiveDate;

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    // ISO first, then the day-first forms users actually type
    let formats = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s.trim(), format) {
            return Some(date);
        }
    }

    None
}
