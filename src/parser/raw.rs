//! Raw input handling: byte decoding and MBOX framing.

use std::borrow::Cow;

/// Decode raw message bytes to text.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
/// A leading UTF-8 BOM is dropped.
pub fn decode_input(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(e) => {
            tracing::warn!(
                valid_up_to = e.valid_up_to(),
                "Input is not valid UTF-8, decoding as Windows-1252"
            );
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}

/// Skip the `From ` separator line at the start of messages copied out of an MBOX.
pub fn skip_from_line(text: &str) -> &str {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.starts_with("From ") {
        if let Some(pos) = text.find('\n') {
            return &text[pos + 1..];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_input("Café".as_bytes()), "Café");
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode_input(b"\xEF\xBB\xBFSubject: Hi"), "Subject: Hi");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0xE9 is 'é' in Windows-1252 and invalid as a lone UTF-8 byte
        assert_eq!(decode_input(b"Caf\xE9"), "Café");
    }

    #[test]
    fn test_skip_from_line() {
        let data = "From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with("Subject:"));
    }

    #[test]
    fn test_skip_from_line_no_from() {
        let data = "Subject: Test\n\nBody\n";
        assert_eq!(skip_from_line(data), data);
    }

    #[test]
    fn test_from_header_is_not_a_separator() {
        let data = "From: alice@example.com\n\nBody\n";
        assert_eq!(skip_from_line(data), data);
    }
}
