//! Locale parsing for request parameters.

use kerb_routing::RequestLocale;
use tracing::warn;

/// Parse a `language[_COUNTRY[_VARIANT]]` locale string.
///
/// Only the first component is used: `it_IT` yields the same locale as
/// `it`, the country and variant components are discarded. Anything that
/// does not start with an alphabetic language code falls back to `en`.
pub fn parse_locale(input: &str) -> RequestLocale {
    let language = input.split('_').next().unwrap_or("").trim();
    if !language.is_empty() && language.chars().all(|c| c.is_ascii_alphabetic()) {
        RequestLocale::new(language.to_ascii_lowercase())
    } else {
        warn!(input, "unparseable locale, defaulting to en");
        RequestLocale::default()
    }
}
