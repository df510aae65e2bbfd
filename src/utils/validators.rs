use once_cell::sync::Lazy;
use regex::Regex;

// Международный формат: необязательный "+" и 7-15 цифр
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").unwrap());

static BOOKING_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,10}[0-9]{10}$").unwrap());

static BOOKING_CODE_PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,10}$").unwrap());

/// Номер телефона гостя. Пробелы, дефисы и скобки допускаются и отбрасываются.
pub fn validate_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(&normalize_phone(phone))
}

pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

pub fn validate_booking_code(code: &str) -> bool {
    BOOKING_CODE_REGEX.is_match(code)
}

pub fn validate_booking_code_prefix(prefix: &str) -> bool {
    BOOKING_CODE_PREFIX_REGEX.is_match(prefix)
}

pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+66812345678"));
        assert!(validate_phone("+7 (777) 123-45-67"));
        assert!(validate_phone("0812345678"));
        assert!(!validate_phone("call me"));
        assert!(!validate_phone("+123"));
        assert!(!validate_phone("+1234567890123456"));
    }

    #[test]
    fn test_validate_booking_code() {
        assert!(validate_booking_code("BK1234567801"));
        assert!(!validate_booking_code("BK12345"));
        assert!(!validate_booking_code("BK-12345678-01"));
    }

    #[test]
    fn test_validate_booking_code_prefix() {
        assert!(validate_booking_code_prefix("BK"));
        assert!(validate_booking_code_prefix("YH2024"));
        assert!(!validate_booking_code_prefix("YH-"));
        assert!(!validate_booking_code_prefix(""));
        assert!(!validate_booking_code_prefix("ABCDEFGHIJK"));
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  BK1234567801 \n"), "BK1234567801");
    }
}
