use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_CURRENCY_CODE: &str = "JPY";

/// Currencies offered in the settings picker.
pub const CURRENCY_PRESETS: [&str; 8] = ["JPY", "USD", "EUR", "GBP", "AUD", "CAD", "CHF", "CNY"];

static CURRENCY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency pattern is valid"));

/// True for a three letter upper-case ISO-4217 style code. No case folding.
pub fn is_valid_currency_code(code: &str) -> bool {
    CURRENCY_CODE_REGEX.is_match(code)
}
