/// Format a Brazilian phone number for display.
/// Handles 11-digit mobile (with the extra 9) and 10-digit landline
/// numbers, normalizing to (XX) XXXXX-XXXX / (XX) XXXX-XXXX.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        _ => phone.to_string(), // Return original if can't format
    }
}

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

/// Format an ISO timestamp to a compact readable form.
pub fn format_datetime(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if raw.len() >= 16 {
        // Fall back to the date + time prefix of "YYYY-MM-DDTHH:MM:SS"
        raw.chars().take(16).collect::<String>().replace('T', " ")
    } else {
        raw.to_string()
    }
}

/// Format a distance in kilometers with one decimal place.
pub fn format_km(distance: Option<f64>) -> String {
    match distance {
        Some(km) => format!("{:.1} km", km),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("1187654321"), "(11) 8765-4321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_datetime() {
        assert_eq!(
            format_datetime("2025-06-12T14:03:00Z"),
            "Jun 12, 2025 14:03"
        );
        assert_eq!(format_datetime("2025-06-12T14:03:00"), "2025-06-12 14:03");
        assert_eq!(format_datetime("soon"), "soon");
    }

    #[test]
    fn test_format_km() {
        assert_eq!(format_km(Some(4.75)), "4.8 km");
        assert_eq!(format_km(None), "-");
    }
}
