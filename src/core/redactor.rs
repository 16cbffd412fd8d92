//! Personal Info Redaction
//!
//! Keeps account emails and login secrets out of log output and debug dumps.

/// Placeholder text for redacted values
pub const REDACTED_PLACEHOLDER: &str = "Hidden";

/// Personal information redactor
pub struct PersonalInfoRedactor;

impl PersonalInfoRedactor {
    /// Partially redact an email, showing first char and domain
    ///
    /// Example: "user@example.com" -> "u***@example.com"
    pub fn partial_redact_email(email: Option<&str>) -> String {
        match email {
            Some(e) if !e.trim().is_empty() => {
                if let Some((local, domain)) = e.split_once('@') {
                    if local.is_empty() {
                        return REDACTED_PLACEHOLDER.to_string();
                    }
                    let first_char: String = local.chars().take(1).collect();
                    format!("{}***@{}", first_char, domain)
                } else {
                    REDACTED_PLACEHOLDER.to_string()
                }
            }
            _ => String::new(),
        }
    }

    /// Redact sensitive CLI arguments (passwords, auth codes) before logging them
    pub fn redact_args(args: &[String]) -> Vec<String> {
        let sensitive_flags = ["--password", "--code"];
        let mut result = Vec::with_capacity(args.len());
        let mut redact_next = false;
        for arg in args {
            if redact_next {
                result.push("[REDACTED]".to_string());
                redact_next = false;
            } else if sensitive_flags.iter().any(|f| arg.starts_with(f)) {
                if let Some((prefix, _)) = arg.split_once('=') {
                    result.push(format!("{}=[REDACTED]", prefix));
                } else {
                    result.push(arg.clone());
                    redact_next = true;
                }
            } else {
                result.push(arg.clone());
            }
        }
        result
    }
}
