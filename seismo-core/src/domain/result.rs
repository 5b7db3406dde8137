//! Job result domain types
//!
//! A result is a tagged payload: the discriminant decides how the bytes are
//! read, and every accessor checks it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// First eight bytes of every PNG file
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Returns true when `bytes` starts with the PNG signature
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

/// Discriminant of a stored result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Json,
    Image,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Json => "json",
            ResultKind::Image => "image",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ResultKind::Json => "application/json",
            ResultKind::Image => "image/png",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a completed job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// UTF-8 encoded JSON document
    Json(Vec<u8>),
    /// PNG encoded image
    Image(Vec<u8>),
}

/// Errors raised when reading or decoding a result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultError {
    #[error("result holds {actual} data, not {expected}")]
    TypeMismatch {
        expected: ResultKind,
        actual: ResultKind,
    },

    #[error("unknown result discriminant '{0}'")]
    UnknownDiscriminant(String),

    #[error("malformed result: {0}")]
    Malformed(String),
}

impl JobResult {
    /// Serializes a structured document into a `json` result
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ResultError> {
        serde_json::to_vec(value)
            .map(JobResult::Json)
            .map_err(|e| ResultError::Malformed(e.to_string()))
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            JobResult::Json(_) => ResultKind::Json,
            JobResult::Image(_) => ResultKind::Image,
        }
    }

    /// Raw payload bytes, whatever the discriminant
    pub fn payload(&self) -> &[u8] {
        match self {
            JobResult::Json(bytes) | JobResult::Image(bytes) => bytes,
        }
    }

    pub fn into_payload(self) -> Vec<u8> {
        match self {
            JobResult::Json(bytes) | JobResult::Image(bytes) => bytes,
        }
    }

    /// Parses the payload of a `json` result
    pub fn as_json(&self) -> Result<serde_json::Value, ResultError> {
        match self {
            JobResult::Json(bytes) => {
                serde_json::from_slice(bytes).map_err(|e| ResultError::Malformed(e.to_string()))
            }
            other => Err(ResultError::TypeMismatch {
                expected: ResultKind::Json,
                actual: other.kind(),
            }),
        }
    }

    /// Borrows the PNG bytes of an `image` result
    pub fn as_image(&self) -> Result<&[u8], ResultError> {
        match self {
            JobResult::Image(bytes) => Ok(bytes),
            other => Err(ResultError::TypeMismatch {
                expected: ResultKind::Image,
                actual: other.kind(),
            }),
        }
    }

    /// Storage encoding: the discriminant, a newline, then the payload
    pub fn encode(&self) -> Vec<u8> {
        let tag = self.kind().as_str().as_bytes();
        let payload = self.payload();
        let mut out = Vec::with_capacity(tag.len() + 1 + payload.len());
        out.extend_from_slice(tag);
        out.push(b'\n');
        out.extend_from_slice(payload);
        out
    }

    /// Inverse of [`JobResult::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self, ResultError> {
        let split = bytes
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| ResultError::Malformed("missing discriminant".to_string()))?;
        let (tag, rest) = bytes.split_at(split);
        let payload = rest[1..].to_vec();

        match tag {
            b"json" => Ok(JobResult::Json(payload)),
            b"image" => Ok(JobResult::Image(payload)),
            other => Err(ResultError::UnknownDiscriminant(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}
