//! URI component encoding shared by pattern compilation and parameter decoding.
//!
//! Both directions follow the ECMAScript `encodeURI` / `decodeURIComponent`
//! rules so that literal template text and captured request segments agree
//! on what "the same path" means.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

/// Bytes `encodeURI` escapes: everything except letters, digits and
/// ``;,/?:@&=+$-_.!~*'()#``.
const ENCODE_URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// A captured path segment could not be percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed percent escape at byte {position} in {input:?}")]
    MalformedEscape { input: String, position: usize },

    #[error("percent-decoded bytes of {input:?} are not valid UTF-8")]
    InvalidUtf8 { input: String },
}

/// Percent-decode every `%XX` escape in `s`, including reserved characters.
///
/// Unlike form decoding, `+` is left alone. Returns `Cow::Borrowed` when `s`
/// contains no escapes.
///
/// # Errors
///
/// - [`DecodeError::MalformedEscape`] — a `%` is not followed by two hex digits.
/// - [`DecodeError::InvalidUtf8`] — the decoded bytes are not UTF-8.
///
/// # Examples
///
/// ```
/// use fetch_router::pattern::decode_uri_component;
///
/// assert_eq!(decode_uri_component("caf%C3%A9").unwrap(), "café");
/// assert_eq!(decode_uri_component("a%2Fb+c").unwrap(), "a/b+c");
/// assert!(decode_uri_component("100%").is_err());
/// ```
pub fn decode_uri_component(s: &str) -> Result<Cow<'_, str>, DecodeError> {
    // `percent_decode_str` passes bad escapes through; reject them instead.
    if let Some(position) = malformed_escape(s) {
        return Err(DecodeError::MalformedEscape {
            input: s.to_owned(),
            position,
        });
    }

    percent_decode_str(s)
        .decode_utf8()
        .map_err(|_| DecodeError::InvalidUtf8 {
            input: s.to_owned(),
        })
}

/// Percent-encode `s` the way `encodeURI` does.
///
/// Letters, digits and ``;,/?:@&=+$-_.!~*'()#`` pass through; every other
/// character (including `%`) is written as uppercase `%XX` UTF-8 escapes.
///
/// # Examples
///
/// ```
/// use fetch_router::pattern::encode_uri;
///
/// assert_eq!(encode_uri("/café"), "/caf%C3%A9");
/// assert_eq!(encode_uri("/a b"), "/a%20b");
/// assert_eq!(encode_uri("/plain"), "/plain");
/// ```
pub fn encode_uri(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, ENCODE_URI).into()
}

// Byte offset of the first `%` not followed by two hex digits.
fn malformed_escape(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'%')
        .map(|(i, _)| i)
        .find(|&i| {
            !matches!(
                bytes.get(i + 1..i + 3),
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_borrows_when_nothing_to_do() {
        assert!(matches!(decode_uri_component("plain"), Ok(Cow::Borrowed("plain"))));
    }

    #[test]
    fn decode_lowercase_hex() {
        assert_eq!(decode_uri_component("caf%c3%a9").unwrap(), "café");
    }

    #[test]
    fn decode_reserved_characters() {
        assert_eq!(decode_uri_component("a%2Fb%3Fc%23d").unwrap(), "a/b?c#d");
    }

    #[test]
    fn decode_rejects_truncated_escape() {
        let err = decode_uri_component("ab%4").unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedEscape {
                input: "ab%4".to_owned(),
                position: 2
            }
        );
    }

    #[test]
    fn decode_rejects_non_hex_escape() {
        assert!(matches!(
            decode_uri_component("%zz"),
            Err(DecodeError::MalformedEscape { position: 0, .. })
        ));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert!(matches!(
            decode_uri_component("caf%E9"),
            Err(DecodeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn encode_escapes_percent_and_space() {
        assert_eq!(encode_uri("100% done"), "100%25%20done");
    }

    #[test]
    fn encode_keeps_reserved_set() {
        let reserved = ";,/?:@&=+$-_.!~*'()#";
        assert_eq!(encode_uri(reserved), reserved);
    }

    #[test]
    fn decode_checks_every_escape() {
        assert!(matches!(
            decode_uri_component("%41%4"),
            Err(DecodeError::MalformedEscape { position: 3, .. })
        ));
        assert_eq!(decode_uri_component("%2525").unwrap(), "%25");
    }

    #[test]
    fn encode_passes_exactly_the_uri_set() {
        let unescaped: String = (0x20u8..0x7f)
            .map(char::from)
            .filter(|c| {
                let mut buf = [0; 4];
                encode_uri(c.encode_utf8(&mut buf)).len() == 1
            })
            .filter(|c| !c.is_ascii_alphanumeric())
            .collect();
        assert_eq!(unescaped, "!#$&'()*+,-./:;=?@_~");
    }

    #[test]
    fn encode_borrows_when_nothing_to_do() {
        assert!(matches!(encode_uri("/users/:id"), Cow::Borrowed("/users/:id")));
    }

    #[test]
    fn encode_then_decode_unicode() {
        let encoded = encode_uri("/日本");
        assert_eq!(encoded, "/%E6%97%A5%E6%9C%AC");
        assert_eq!(decode_uri_component(&encoded).unwrap(), "/日本");
    }
}
