use chrono::{DateTime, NaiveDateTime};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a backend timestamp as e.g. `Mar 01, 2025`.
///
/// The backend sends naive ISO timestamps (`2025-03-01T08:30:00.123456`);
/// RFC 3339 with an offset is accepted too.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 && date.is_char_boundary(10) {
        date[..10].to_string()
    } else {
        date.to_string()
    }
}

/// Latitude/longitude to six decimal places
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{:.6}, {:.6}", latitude, longitude)
}

/// Case-insensitive substring match, used by list search
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Café Crème", 6), "Caf...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-01T08:30:00.123456"), "Mar 01, 2025");
        assert_eq!(format_date("2025-03-01T08:30:00"), "Mar 01, 2025");
        assert_eq!(format_date("2025-03-01T08:30:00+02:00"), "Mar 01, 2025");
        assert_eq!(format_date("2025-03-01 junk"), "2025-03-01");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(40.7128, -74.006), "40.712800, -74.006000");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Kenya AA", "kenya"));
        assert!(contains_ignore_case("V60", ""));
        assert!(!contains_ignore_case("Chemex", "v60"));
    }
}
