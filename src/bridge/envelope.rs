use thiserror::Error;

/// The maximum number of characters a slot may hold.
pub const MAX_SLOT_CHARS: usize = 2000;

/// The number of colon-separated fields in auth, AI, and send requests.
pub const REQUEST_FIELDS: usize = 3;

/// Why a slot's content was rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The content is empty after trimming and unquoting.
    #[error("empty content")]
    Empty,

    /// The content exceeds the slot capacity.
    #[error("content exceeds {MAX_SLOT_CHARS} characters")]
    Oversized,

    /// More than 10% of the characters are non-printable.
    #[error("content is mostly non-printable")]
    NonPrintable,

    /// The content does not split into exactly three fields.
    #[error("expected exactly {REQUEST_FIELDS} colon-separated fields")]
    FieldCount,
}

/// Strips one layer of surrounding double quotes.
fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Returns whether at most 10% of the characters are non-printable.
///
/// Printable means the ASCII range `' '..='~'` plus tab, CR, and LF. A
/// higher ratio indicates a corrupted or partially-written slot read.
fn printable_ratio_ok(value: &str) -> bool {
    let total = value.chars().count();
    if total == 0 {
        return true;
    }

    let non_printable = value
        .chars()
        .filter(|c| !matches!(c, ' '..='~' | '\t' | '\r' | '\n'))
        .count();

    non_printable * 10 <= total
}

/// Normalizes raw slot content into a validated string.
///
/// Trims surrounding whitespace, strips one layer of double quotes, and
/// rejects empty, oversized, or mostly non-printable content. This is the
/// single choke point for untrusted slot reads; it performs no I/O.
pub fn sanitize(raw: &str) -> Result<String, EnvelopeError> {
    let trimmed = unquote(raw.trim()).trim();

    if trimmed.is_empty() {
        return Err(EnvelopeError::Empty);
    }

    if trimmed.chars().count() > MAX_SLOT_CHARS {
        return Err(EnvelopeError::Oversized);
    }

    if !printable_ratio_ok(trimmed) {
        return Err(EnvelopeError::NonPrintable);
    }

    Ok(trimmed.to_string())
}

/// Parses raw slot content into exactly three colon-separated fields.
///
/// The split stops after three parts, so the final field may itself
/// contain `:`. Each field is independently trimmed and unquoted.
pub fn parse_fields(raw: &str) -> Result<[String; 3], EnvelopeError> {
    let content = sanitize(raw)?;

    let mut parts = content.splitn(REQUEST_FIELDS, ':');
    let first = parts.next().ok_or(EnvelopeError::FieldCount)?;
    let second = parts.next().ok_or(EnvelopeError::FieldCount)?;
    let third = parts.next().ok_or(EnvelopeError::FieldCount)?;

    let clean = |field: &str| unquote(field.trim()).trim().to_string();

    Ok([clean(first), clean(second), clean(third)])
}
