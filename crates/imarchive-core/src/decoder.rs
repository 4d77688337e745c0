//! Best-effort recovery of display text from message rows.
//!
//! A message carries its body either as plain `text` or as an archived
//! rich-text object graph (`attributedBody`). The archive format is not parsed
//! here. Instead the blob is scanned for printable ASCII runs, structural
//! class-name tokens are discarded, and the longest surviving run is taken as
//! the user's text.
//!
//! Known gap: text split across non-contiguous runs, non-ASCII text, or text
//! shorter than an unrecognized structural tag is not recovered. Such messages
//! decode to [`RICH_TEXT_SENTINEL`] while the raw blob remains available on
//! [`Message::rich_text`](imarchive_types::message::Message::rich_text).
//!
//! The archived string is preceded by `+` and a one-byte length. For bodies of
//! 32 to 126 bytes that length byte is printable, so the recovered text keeps
//! a two-character prefix such as `+(`.

use std::sync::LazyLock;

use imarchive_types::message::Message;
use regex::bytes::Regex;
use thiserror::Error;

pub const RICH_TEXT_SENTINEL: &str = "[Rich Text Message]";
pub const ATTACHMENT_SENTINEL: &str = "[Attachment]";
pub const EMPTY_SENTINEL: &str = "[Empty Message]";

/// Shortest printable run considered at all.
const MIN_RUN_LEN: usize = 4;

/// A selected run must be longer than this after trimming.
const MIN_RECOVERED_LEN: usize = 4;

/// Runs containing any of these are archive metadata, not user content.
const NOISE_TOKENS: &[&str] = &[
    "NSString",
    "NSMutable",
    "CFString",
    "bplist",
    "__",
    "NSAttributedString",
    "NSObject",
    "NSDictionary",
    "NSNumber",
    "NSValue",
    "NSArray",
    "NSKeyedArchiver",
    "streamtyped",
];

static NSSTRING_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s-u)NSString[^"]*"([^"\x00]+)""#).expect("valid NSString pattern")
});

static XML_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)<string>(.*?)</string>").expect("valid <string> pattern")
});

/// Why a rich-text blob yielded no text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeFailure {
    #[error("message has neither text nor rich-text content")]
    NoContent,

    #[error("rich-text blob is empty")]
    EmptyBlob,

    #[error("no recoverable text in {0}-byte rich-text blob")]
    Unrecoverable(usize),
}

/// The outcome of decoding a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayText {
    /// Non-empty plain text, trimmed.
    Plain(String),
    /// Text recovered from the rich-text blob.
    Recovered(String),
    /// A blob was present but nothing usable came out of it.
    RichTextUnrecoverable,
    Attachment,
    Empty,
}

impl DisplayText {
    pub fn as_str(&self) -> &str {
        match self {
            DisplayText::Plain(text) | DisplayText::Recovered(text) => text,
            DisplayText::RichTextUnrecoverable => RICH_TEXT_SENTINEL,
            DisplayText::Attachment => ATTACHMENT_SENTINEL,
            DisplayText::Empty => EMPTY_SENTINEL,
        }
    }

    /// Whether this is real message content rather than a sentinel label.
    pub fn is_content(&self) -> bool {
        matches!(self, DisplayText::Plain(_) | DisplayText::Recovered(_))
    }

    pub fn into_string(self) -> String {
        match self {
            DisplayText::Plain(text) | DisplayText::Recovered(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

/// Decode the display text of a message body.
///
/// Priority: trimmed plain text, then blob recovery (falling back to
/// [`RICH_TEXT_SENTINEL`]), then the attachment label, then the empty label.
/// Never fails.
pub fn decode(text: Option<&str>, blob: Option<&[u8]>, has_attachments: bool) -> DisplayText {
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        return DisplayText::Plain(text.to_string());
    }
    if let Some(blob) = blob {
        return match extract_blob_text(blob) {
            Ok(text) => DisplayText::Recovered(text),
            Err(_) => DisplayText::RichTextUnrecoverable,
        };
    }
    if has_attachments {
        DisplayText::Attachment
    } else {
        DisplayText::Empty
    }
}

/// Decode a stored message.
pub fn decode_message(message: &Message) -> DisplayText {
    decode(
        message.text.as_deref(),
        message.rich_text.as_deref(),
        message.has_attachments,
    )
}

/// Recover searchable content only: plain text or recovered blob text.
///
/// Sentinel labels are reported as failures so callers never match on them.
pub fn recover_content(message: &Message) -> Result<String, DecodeFailure> {
    if let Some(text) = message.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(text.to_string());
    }
    match message.rich_text.as_deref() {
        Some(blob) => extract_blob_text(blob),
        None => Err(DecodeFailure::NoContent),
    }
}

/// Whether the row has anything worth showing in a thread.
pub fn has_displayable_content(message: &Message) -> bool {
    message.text.as_deref().is_some_and(|t| !t.is_empty())
        || message.rich_text.is_some()
        || message.has_attachments
}

/// Run the heuristic extraction over a rich-text blob.
pub fn extract_blob_text(blob: &[u8]) -> Result<String, DecodeFailure> {
    if blob.is_empty() {
        return Err(DecodeFailure::EmptyBlob);
    }

    if let Some(run) = longest_content_run(blob) {
        let trimmed = run.trim();
        if trimmed.len() > MIN_RECOVERED_LEN {
            return Ok(trimmed.to_string());
        }
    }

    for pattern in [&*NSSTRING_QUOTED, &*XML_STRING] {
        let found = pattern
            .captures(blob)
            .and_then(|caps| caps.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(text) = found {
            return Ok(text);
        }
    }

    Err(DecodeFailure::Unrecoverable(blob.len()))
}

/// Maximal runs of printable ASCII (0x20..=0x7E) of at least [`MIN_RUN_LEN`] bytes.
fn printable_runs(blob: &[u8]) -> Vec<&str> {
    blob.split(|b| !(0x20..=0x7E).contains(b))
        .filter(|run| run.len() >= MIN_RUN_LEN)
        // Printable ASCII is always valid UTF-8.
        .filter_map(|run| std::str::from_utf8(run).ok())
        .collect()
}

fn is_noise(run: &str) -> bool {
    NOISE_TOKENS.iter().any(|token| run.contains(token))
}

/// The longest non-noise run; the earliest wins on ties.
fn longest_content_run(blob: &[u8]) -> Option<&str> {
    let mut best: Option<&str> = None;
    for run in printable_runs(blob).into_iter().filter(|run| !is_noise(run)) {
        if best.is_none_or(|b| run.len() > b.len()) {
            best = Some(run);
        }
    }
    best
}
