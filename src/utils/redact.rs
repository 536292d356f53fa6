//! Secret scrubbing for provider-supplied error text.

use once_cell::sync::Lazy;
use regex::Regex;

static KEY_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([?&](?:key|api_key)=)[^&\s]+").expect("valid regex"));
static BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(bearer\s+)[A-Za-z0-9._\-]+").expect("valid regex"));

const MASK: &str = "[redacted]";

/// Remove `secret` and common credential patterns from `text`.
pub fn scrub(text: &str, secret: &str) -> String {
    let mut out = if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, MASK)
    };
    out = KEY_PARAM.replace_all(&out, "${1}[redacted]").into_owned();
    out = BEARER.replace_all(&out, "${1}[redacted]").into_owned();
    out
}
