mod abort_signal;

pub use self::abort_signal::{create_abort_signal, watch_abort_signal, AbortSignal};

use fancy_regex::Regex;
use std::sync::LazyLock;

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").unwrap());

pub fn get_env_name(key: &str) -> String {
    format!(
        "{}_{}",
        env!("CARGO_CRATE_NAME").to_ascii_uppercase(),
        key.to_ascii_uppercase(),
    )
}

/// Returns the body of the first fenced code block, or the whole text when there is none.
pub fn extract_code(text: &str) -> String {
    match CODE_BLOCK_RE.captures(text) {
        Ok(Some(caps)) => caps
            .get(1)
            .map(|v| v.as_str().to_string())
            .unwrap_or_default(),
        _ => text.to_string(),
    }
}
