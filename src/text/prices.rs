use once_cell::sync::Lazy;
use regex::Regex;

/// Separator placed between price tokens in an extracted price set.
pub const PRICE_SEPARATOR: &str = " | ";

/// Currency symbols and ISO codes recognised next to a numeral.
const CURRENCY_MARKER: &str = r"(?:[$₱£€¥₹]|PHP|USD|EUR|GBP|JPY|INR)";
/// Whole part with optional thousands groups and an optional two-digit
/// fractional part. `\d` matches any Unicode decimal digit.
const AMOUNT: &str = r"\d+(?:,\d{3})*(?:\.\d{2})?";

static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i){marker}\s*{amount}|{amount}\s*{marker}",
        marker = CURRENCY_MARKER,
        amount = AMOUNT,
    );
    Regex::new(&pattern).expect("price pattern is a valid regular expression")
});

/// Returns every price token in `text`, left to right, joined with
/// [`PRICE_SEPARATOR`]. Empty when nothing matches.
///
/// A token is a currency marker directly before or after an amount, with
/// only optional whitespace between the two.
pub fn extract_prices(text: &str) -> String {
    price_tokens(text).join(PRICE_SEPARATOR)
}

/// The individual tokens behind [`extract_prices`].
pub fn price_tokens(text: &str) -> Vec<&str> {
    PRICE_PATTERN
        .find_iter(text)
        .map(|token| token.as_str())
        .collect()
}
