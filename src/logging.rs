//! Logging setup with secret redaction.
//!
//! Log events are collected by [`SecretMaskingWriter`] and masked with
//! [`RedactionPatterns`] before they reach stderr. Bot tokens inside request
//! URLs and completion API keys are replaced with placeholders.

use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
pub struct RedactionPatterns {
    token_in_url: Regex,
    bare_token: Regex,
    bot_prefixed_token: Regex,
    api_key_env: Regex,
    bearer: Regex,
    secret_key: Regex,
}

impl RedactionPatterns {
    /// Compile all patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_in_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            bare_token: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            bot_prefixed_token: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            api_key_env: Regex::new(r"((?:AI|OPENAI)_API_KEY=)[^\s&]+")?,
            bearer: Regex::new(r"(Bearer )[A-Za-z0-9._-]+")?,
            secret_key: Regex::new(r"sk-[A-Za-z0-9_-]{16,}")?,
        })
    }

    /// Mask every secret found in `input`
    #[must_use]
    pub fn redact(&self, input: &str) -> String {
        let mut output = self
            .token_in_url
            .replace_all(input, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .bare_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .bot_prefixed_token
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .api_key_env
            .replace_all(&output, "$1[MASKED]")
            .to_string();
        output = self.bearer.replace_all(&output, "$1[MASKED]").to_string();
        output = self
            .secret_key
            .replace_all(&output, "sk-[MASKED]")
            .to_string();
        output
    }
}

/// Buffers one formatted event and masks it as a whole.
///
/// A secret split across several `write` calls is still caught, since masking
/// runs on flush or drop over the complete line.
pub struct SecretMaskingWriter<W: Write> {
    target: W,
    masks: Arc<RedactionPatterns>,
    pending: Vec<u8>,
}

impl<W: Write> SecretMaskingWriter<W> {
    /// Mask everything written before it reaches `target`
    pub const fn new(target: W, masks: Arc<RedactionPatterns>) -> Self {
        Self {
            target,
            masks,
            pending: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.pending);
        let masked = self.masks.redact(&line);
        self.pending.clear();
        self.target.write_all(masked.as_bytes())
    }
}

impl<W: Write> Write for SecretMaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()?;
        self.target.flush()
    }
}

impl<W: Write> Drop for SecretMaskingWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.emit() {
            eprintln!("Failed to write log line: {e}");
        }
    }
}

/// Hands a fresh [`SecretMaskingWriter`] to every log event
pub struct SecretMaskingMakeWriter<F> {
    open_target: F,
    masks: Arc<RedactionPatterns>,
}

impl<F> SecretMaskingMakeWriter<F> {
    /// `open_target` yields the underlying stream, e.g. [`io::stderr`]
    pub const fn new(open_target: F, masks: Arc<RedactionPatterns>) -> Self {
        Self { open_target, masks }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for SecretMaskingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = SecretMaskingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        SecretMaskingWriter::new((self.open_target)(), Arc::clone(&self.masks))
    }
}

/// Default filter directive: `debug` when `DEBUG_MODE` is `true` or `1`
#[must_use]
pub fn default_level(debug_mode: Option<&str>) -> &'static str {
    match debug_mode.map(str::trim) {
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => "debug",
        _ => "info",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the `DEBUG_MODE` default when set.
pub fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = SecretMaskingMakeWriter::new(io::stderr, patterns);
    let debug_mode = std::env::var("DEBUG_MODE").ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug_mode.as_deref())));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> RedactionPatterns {
        RedactionPatterns::new().expect("patterns compile")
    }

    #[test]
    fn test_redacts_token_in_request_url() {
        let line = "error sending request for url (https://api.telegram.org/bot123456789:AAbbCCddEEffGGhhIIjjKKllMMnnOOppQQr/SendMessage)";
        let redacted = patterns().redact(line);
        assert!(!redacted.contains("AAbbCCdd"));
        assert!(redacted.contains("[TELEGRAM_TOKEN]"));
    }

    #[test]
    fn test_redacts_api_keys() {
        let p = patterns();
        assert_eq!(p.redact("AI_API_KEY=abc123 rest"), "AI_API_KEY=[MASKED] rest");
        assert_eq!(
            p.redact("using sk-proj1234567890abcdefXYZ"),
            "using sk-[MASKED]"
        );
        assert_eq!(
            p.redact("Authorization: Bearer tok.en-value"),
            "Authorization: Bearer [MASKED]"
        );
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let line = "User 42 entered AI support mode.";
        assert_eq!(patterns().redact(line), line);
    }

    #[test]
    fn test_writer_masks_on_drop() {
        let mut sink = Vec::new();
        let mut writer = SecretMaskingWriter::new(&mut sink, Arc::new(patterns()));
        let input = b"OPENAI_API_KEY=verysecretvalue\n";
        assert_eq!(writer.write(input).ok(), Some(input.len()));
        drop(writer);
        assert_eq!(String::from_utf8_lossy(&sink), "OPENAI_API_KEY=[MASKED]\n");
    }

    #[test]
    fn test_secret_split_across_writes_is_masked() {
        let mut sink = Vec::new();
        {
            let mut writer = SecretMaskingWriter::new(&mut sink, Arc::new(patterns()));
            writer.write_all(b"key sk-proj12345").ok();
            writer.write_all(b"67890abcdef done\n").ok();
            writer.flush().ok();
        }
        assert_eq!(String::from_utf8_lossy(&sink), "key sk-[MASKED] done\n");
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(None), "info");
        assert_eq!(default_level(Some("true")), "debug");
        assert_eq!(default_level(Some("1")), "debug");
        assert_eq!(default_level(Some("no")), "info");
    }
}
