//! Byte encoding for baked wind data.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors produced while encoding or decoding baked functions and sources.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Bincode could not encode the value.
    #[error("bincode encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// The bytes are not a valid encoding.
    #[error("bincode decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// A value decoded but did not use the whole buffer.
    #[error("{remaining} trailing bytes after decoded value ({len} bytes total)")]
    TrailingBytes { remaining: usize, len: usize },
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
    Ok(bytes)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    let (value, consumed) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    if consumed != bytes.len() {
        return Err(SerializationError::TrailingBytes {
            remaining: bytes.len() - consumed,
            len: bytes.len(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&(1u32, 2.5f32)).unwrap();
        bytes.push(0);
        let err = decode::<(u32, f32)>(&bytes).unwrap_err();
        assert!(matches!(
            err,
            SerializationError::TrailingBytes { remaining: 1, .. }
        ));
    }

    #[test]
    fn test_truncated_input_is_decode_error() {
        let bytes = encode(&(1u32, 2.5f32)).unwrap();
        let err = decode::<(u32, f32)>(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, SerializationError::Decode(_)));
    }
}
