use regex::Regex;
use std::sync::OnceLock;

/// Sanitization patterns for removing sensitive data from logs
pub struct SanitizationPatterns {
    bearer_token: Regex,
    api_key: Regex,
    password_field: Regex,
    email: Regex,
}

static PATTERNS: OnceLock<SanitizationPatterns> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid sanitization pattern {pattern}: {e}"))
}

/// Get compiled regex patterns for sanitization
pub fn get_patterns() -> &'static SanitizationPatterns {
    PATTERNS.get_or_init(|| SanitizationPatterns {
        bearer_token: compile(r"(?i)bearer\s+[a-zA-Z0-9\-_\.~+/=]+"),
        api_key: compile(r"\b(sk_|pk_|api_|key_)[a-zA-Z0-9_]{15,}\b"),
        password_field: compile(r"(?i)(password|passwd|pwd|token)\s*[:=]\s*\S+"),
        email: compile(r"\b([a-zA-Z0-9._%+-]+)@([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})\b"),
    })
}

/// Sanitize log message by removing sensitive data
///
/// - Bearer tokens (shows `Bearer [REDACTED]`)
/// - API keys (shows `[REDACTED]`)
/// - Password and token fields (shows `field=[REDACTED]`)
/// - Email addresses (shows `***@domain.com`)
pub fn sanitize_log_message(message: &str) -> String {
    let patterns = get_patterns();
    let mut result = message.to_string();

    result = patterns.bearer_token.replace_all(&result, "Bearer [REDACTED]").to_string();
    result = patterns.api_key.replace_all(&result, "[REDACTED]").to_string();
    result = patterns.password_field.replace_all(&result, "$1=[REDACTED]").to_string();
    result = patterns.email.replace_all(&result, "***@$2").to_string();

    result
}
