use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::blocking::Client;
use tracing::debug;

#[derive(Debug)]
pub enum CodecError {
    Encode(String),
    Decode(String),
    InvalidUri(String),
    /// The remote server answered with a non-success status.
    Status(u16),
    /// The fetch failed before any response arrived.
    Network(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Encode(msg) => write!(f, "Encoding failed: {}", msg),
            CodecError::Decode(msg) => write!(f, "Invalid content token: {}", msg),
            CodecError::InvalidUri(uri) => write!(f, "Not a valid http(s) address: {}", uri),
            CodecError::Status(code) => write!(f, "Remote server answered {}", code),
            CodecError::Network(msg) => write!(f, "Could not reach remote server: {}", msg),
        }
    }
}

impl Error for CodecError {}

/// Compresses source text and encodes it into a URL-safe token.
/// Lossless inverse of [`decode_content`].
pub fn encode_content(text: &str) -> Result<String, CodecError> {
    let compressed =
        zstd::encode_all(text.as_bytes(), 0).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decodes a token produced by [`encode_content`] back into source text.
pub fn decode_content(token: &str) -> Result<String, CodecError> {
    let compressed = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let bytes =
        zstd::decode_all(compressed.as_slice()).map_err(|e| CodecError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encodes a remote fetch address for URL embedding. A plain binary-to-text
/// transform, not compression.
pub fn encode_remote_uri(uri: &str) -> String {
    URL_SAFE_NO_PAD.encode(uri.as_bytes())
}

/// Decodes a token produced by [`encode_remote_uri`].
pub fn decode_remote_uri(token: &str) -> Result<String, CodecError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Fetches repertoire text from a remote address.
///
/// The address is validated before any fetch attempt; a non-success response
/// status and a network failure are reported as distinct errors, with no
/// state changed in either case.
pub fn load_from_remote(uri: &str) -> Result<String, CodecError> {
    let url = reqwest::Url::parse(uri).map_err(|_| CodecError::InvalidUri(uri.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CodecError::InvalidUri(uri.to_string()));
    }

    debug!(%url, "fetching remote repertoire");
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| CodecError::Network(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| CodecError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CodecError::Status(status.as_u16()));
    }

    response.text().map_err(|e| CodecError::Network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_round_trip() {
        let source = r#"[Event "Italian"]
1. e4 e5 2. Nf3 Nc6 3. Bc4 {a classic} *
"#;
        let token = encode_content(source).unwrap();
        assert_eq!(decode_content(&token).unwrap(), source);
    }

    #[test]
    fn test_content_round_trip_unicode_and_specials() {
        let source = "[Event \"Défense française — š€🨄\"]\n1. e4 {braces } stay [ok] *\n";
        let token = encode_content(source).unwrap();
        assert_eq!(decode_content(&token).unwrap(), source);
    }

    #[test]
    fn test_content_token_is_url_safe() {
        let token = encode_content("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 *").unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_decode_content_rejects_garbage() {
        assert!(matches!(
            decode_content("not/base64!"),
            Err(CodecError::Decode(_))
        ));
        // Valid base64, not valid zstd
        let bogus = URL_SAFE_NO_PAD.encode(b"plain text");
        assert!(matches!(decode_content(&bogus), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_remote_uri_round_trip() {
        let uri = "https://example.com/repertoire.pgn?user=42";
        assert_eq!(decode_remote_uri(&encode_remote_uri(uri)).unwrap(), uri);
    }

    #[test]
    fn test_load_from_remote_rejects_malformed_address_before_fetching() {
        assert!(matches!(
            load_from_remote("not a uri"),
            Err(CodecError::InvalidUri(_))
        ));
        assert!(matches!(
            load_from_remote("ftp://example.com/x.pgn"),
            Err(CodecError::InvalidUri(_))
        ));
    }
}
