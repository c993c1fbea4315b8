/// Parse a decimal token such as `29.4977`, `-95.1599` or `6.31`.
///
/// Non-finite spellings (`inf`, `NaN`) are rejected.
///
/// # Examples
/// ```
/// use amax_processor::utils::parse_decimal;
///
/// assert_eq!(parse_decimal(" 6.31 "), Some(6.31));
/// assert_eq!(parse_decimal("NaN"), None);
/// ```
pub fn parse_decimal(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
