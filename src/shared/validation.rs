use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Protocol numbers handed out as submission receipts
    /// - Valid: "PRT-20261018-3F9A1C2B7D4E"
    /// - Invalid: "prt-20261018-3f9a1c2b7d4e", "PRT-2026-3F9A", "3F9A1C2B7D4E"
    pub static ref PROTOCOL_NUMBER_REGEX: Regex =
        Regex::new(r"^PRT-[0-9]{8}-[0-9A-F]{12}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_number_regex_valid() {
        assert!(PROTOCOL_NUMBER_REGEX.is_match("PRT-20261018-3F9A1C2B7D4E"));
        assert!(PROTOCOL_NUMBER_REGEX.is_match("PRT-20250101-000000000000"));
    }

    #[test]
    fn test_protocol_number_regex_invalid() {
        assert!(!PROTOCOL_NUMBER_REGEX.is_match("prt-20261018-3F9A1C2B7D4E")); // lowercase prefix
        assert!(!PROTOCOL_NUMBER_REGEX.is_match("PRT-20261018-3f9a1c2b7d4e")); // lowercase hex
        assert!(!PROTOCOL_NUMBER_REGEX.is_match("PRT-2026-3F9A1C2B7D4E")); // short date
        assert!(!PROTOCOL_NUMBER_REGEX.is_match("PRT-20261018-3F9A")); // short token
        assert!(!PROTOCOL_NUMBER_REGEX.is_match("")); // empty
    }
}
