use crate::error::StratdeskError;
use crate::history::Period;

pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_SYMBOL_LENGTH: usize = 20;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, StratdeskError> {
    if input.len() > max_len {
        return Err(StratdeskError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(StratdeskError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a free-text search query: enforce length, strip control chars, trim.
pub fn validate_search(input: &str) -> Result<String, StratdeskError> {
    sanitize_text(input, MAX_SEARCH_LENGTH)
}

/// Validate a ticker symbol and return it uppercased.
///
/// Accepts letters, digits, and the punctuation tickers actually use
/// (`.` for share classes and foreign listings, `-`, `^` for indices, `=` for FX/futures).
/// The symbol becomes a URL path segment, so it must contain at least one
/// letter or digit.
pub fn validate_symbol(input: &str) -> Result<String, StratdeskError> {
    let symbol = sanitize_text(input, MAX_SYMBOL_LENGTH)?.to_uppercase();
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(StratdeskError::InvalidInput(format!(
            "invalid character '{}' in symbol '{}'",
            bad, symbol
        )));
    }
    if !symbol.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(StratdeskError::InvalidInput(format!(
            "symbol '{}' has no letters or digits",
            symbol
        )));
    }
    Ok(symbol)
}

/// Validate a series period string (1d, 1mo, 3mo, 1y, 5y, max), case-insensitive.
pub fn validate_period(input: &str) -> Result<Period, StratdeskError> {
    input.parse()
}

/// Validate that a price or amount is a finite number greater than zero.
pub fn validate_positive(field: &str, value: f64) -> Result<f64, StratdeskError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StratdeskError::InvalidInput(format!(
            "{} must be greater than 0, got {}",
            field, value
        )))
    }
}

/// Validate that a percentage is finite and not negative.
pub fn validate_percent(field: &str, value: f64) -> Result<f64, StratdeskError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(StratdeskError::InvalidInput(format!(
            "{} must be 0 or greater, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_trims_and_strips_controls() {
        assert_eq!(validate_search("  apple\t\n").unwrap(), "apple");
        assert_eq!(validate_search("app\x07le").unwrap(), "apple");
    }

    #[test]
    fn empty_search_rejected() {
        assert!(validate_search("").is_err());
        assert!(validate_search("   ").is_err());
        assert!(validate_search("\n\t").is_err());
    }

    #[test]
    fn long_search_rejected() {
        let long = "a".repeat(MAX_SEARCH_LENGTH + 1);
        assert!(validate_search(&long).is_err());
        assert!(validate_search(&"a".repeat(MAX_SEARCH_LENGTH)).is_ok());
    }

    #[test]
    fn symbol_uppercased() {
        assert_eq!(validate_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(validate_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(validate_symbol("^gspc").unwrap(), "^GSPC");
        assert_eq!(validate_symbol("eurusd=x").unwrap(), "EURUSD=X");
    }

    #[test]
    fn symbol_bad_chars_rejected() {
        assert!(validate_symbol("AA PL").is_err());
        assert!(validate_symbol("AAPL/../x").is_err());
        assert!(validate_symbol("AAPL?apikey=x").is_err());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol(".").is_err());
        assert!(validate_symbol("..").is_err());
        assert!(validate_symbol("-").is_err());
        assert!(validate_symbol("^=").is_err());
        assert!(validate_symbol(&"A".repeat(MAX_SYMBOL_LENGTH + 1)).is_err());
    }

    #[test]
    fn period_validation() {
        assert_eq!(validate_period("1Y").unwrap(), Period::OneYear);
        assert!(validate_period("week").is_err());
    }

    #[test]
    fn positive_numbers() {
        assert_eq!(validate_positive("basePrice", 10.5).unwrap(), 10.5);
        assert!(validate_positive("basePrice", 0.0).is_err());
        assert!(validate_positive("basePrice", -1.0).is_err());
        assert!(validate_positive("basePrice", f64::NAN).is_err());
        assert!(validate_positive("basePrice", f64::INFINITY).is_err());
    }

    #[test]
    fn percents() {
        assert_eq!(validate_percent("dropRate", 0.0).unwrap(), 0.0);
        assert!(validate_percent("dropRate", -5.0).is_err());
    }

    #[test]
    fn error_message_names_field() {
        let err = validate_positive("basePrice", 0.0).unwrap_err();
        assert!(err.to_string().contains("basePrice"));
    }
}
