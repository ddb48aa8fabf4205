//! Extraction of the anti-automation tokens embedded in the sign-in page

use crate::ExtractionError;
use regex::Regex;
use serde::Deserialize;

/// A `{"name": ..., "value": ...}` pair found in page markup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub name: String,
    pub value: String,
}

/// The three values the login form must echo back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTokens {
    /// `srt` token
    pub session_token: String,
    /// `rqid` token
    pub request_id: String,
    /// `dfpmid` value from inline script
    pub device_id: String,
}

/// Finds login tokens in raw sign-in page bodies
///
/// Patterns are compiled once; the extractor itself is stateless.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    session_token: Regex,
    request_id: Regex,
    device_id: Regex,
}

impl TokenExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            session_token: Regex::new(r#"\{"name":"srt","value":"\w+"\}"#)?,
            request_id: Regex::new(r#"\{"name":"rqid","value":"\w+"\}"#)?,
            device_id: Regex::new(r#""dfpmid":"(.+?)""#)?,
        })
    }

    /// Extracts all three tokens from `body`
    ///
    /// Fails on the first token that is missing or malformed; a partial set
    /// is never returned.
    pub fn extract(&self, body: &str) -> Result<LoginTokens, ExtractionError> {
        let session_token = find_token(&self.session_token, body, "srt")?;
        let request_id = find_token(&self.request_id, body, "rqid")?;
        let device_id = self
            .device_id
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ExtractionError::MissingToken { name: "dfpmid" })?;

        Ok(LoginTokens {
            session_token: session_token.value,
            request_id: request_id.value,
            device_id,
        })
    }
}

fn find_token(pattern: &Regex, body: &str, name: &'static str) -> Result<Token, ExtractionError> {
    let fragment = pattern
        .find(body)
        .ok_or(ExtractionError::MissingToken { name })?;

    serde_json::from_str(fragment.as_str())
        .map_err(|source| ExtractionError::MalformedToken { name, source })
}
