use std::panic;

const REDACTED: &str = "[REDACTED]";
const MAX_LOGGED_BODY_CHARS: usize = 256;

const SENSITIVE_MARKERS: [&str; 6] = [
    "token",
    "authorization",
    "bearer",
    "password",
    "secret",
    "apikey",
];

/// Scrubs credential-looking fragments from free text before it is logged.
pub fn redact_text(input: &str) -> String {
    let mut redact_next = false;

    input
        .split_whitespace()
        .map(|chunk| {
            let lowered = chunk.to_ascii_lowercase();
            let is_marker = SENSITIVE_MARKERS
                .iter()
                .any(|marker| lowered.contains(marker));

            let scrubbed = if redact_next || is_marker || looks_like_secret_value(chunk) {
                REDACTED.to_owned()
            } else {
                chunk.to_owned()
            };

            // "Bearer <token>" and "token: <value>" carry the secret in the next chunk.
            redact_next = is_marker && (lowered == "bearer" || chunk.ends_with(':'));
            scrubbed
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Redacts and truncates an HTTP error body for logging.
pub fn redact_body(body: &str) -> String {
    let redacted = redact_text(body);
    if redacted.chars().count() <= MAX_LOGGED_BODY_CHARS {
        return redacted;
    }

    let truncated: String = redacted.chars().take(MAX_LOGGED_BODY_CHARS).collect();
    format!("{truncated}...")
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "sweep-inbox panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("sweep-inbox panic: {}", scrubbed);
        }
    }));
}

/// JWTs and long opaque tokens: at least 24 chars of base64url/dot alphabet
/// mixing letters and digits.
fn looks_like_secret_value(value: &str) -> bool {
    let cleaned = value.trim_matches(|ch: char| !ch.is_ascii_alphanumeric());

    let token_alphabet = cleaned
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    let has_mixed = cleaned.chars().any(|ch| ch.is_ascii_alphabetic())
        && cleaned.chars().any(|ch| ch.is_ascii_digit());

    cleaned.len() >= 24 && token_alphabet && has_mixed
}
