// Serializer - persists object graphs to bytes / files and back
//
// JSON via serde_json. Encoding fails if any reachable member refuses to
// serialize (e.g. a map with non-string keys); decoding fails on corrupt or
// type-incompatible data. Both surface as AppError::Serialization.
//
// Channel envelopes go through the same path: bytes that are not JSON are a
// serialization error, JSON that is not an envelope is a protocol violation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::domain::Envelope;
use crate::error::Result;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Persist `value` to `path`, replacing any previous content
pub fn write<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = encode(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Restore a value previously stored with [`write`]
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope> {
    Envelope::from_value(decode::<Value>(bytes)?)
}

pub fn read_envelope(path: &Path) -> Result<Envelope> {
    Envelope::from_value(read::<Value>(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Build {
        target: String,
        flags: Vec<String>,
        outputs: Option<Vec<String>>,
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.task");
        let build = Build {
            target: "x86_64".to_string(),
            flags: vec!["-O2".to_string()],
            outputs: None,
        };

        write(&path, &build).unwrap();
        let back: Build = read(&path).unwrap();

        assert_eq!(back, build);
    }

    #[test]
    fn test_unserializable_member_rejected() {
        let mut map: HashMap<(u8, u8), u8> = HashMap::new();
        map.insert((1, 2), 3);

        let err = encode(&map).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_type_incompatible_data_rejected() {
        let bytes = encode(&serde_json::json!({"target": 7})).unwrap();
        let err = decode::<Build>(&bytes).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read::<Build>(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_envelope_corrupt_vs_foreign() {
        let corrupt = decode_envelope(b"\x00\x01not json").unwrap_err();
        assert!(matches!(corrupt, AppError::Serialization(_)));

        let foreign = decode_envelope(br#"{"status":"exploded","contract":1}"#).unwrap_err();
        assert!(matches!(foreign, AppError::ProtocolViolation(_)));

        let scalar = decode_envelope(b"42").unwrap_err();
        assert!(matches!(scalar, AppError::ProtocolViolation(_)));
    }

    #[test]
    fn test_envelope_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outcome.task");
        let envelope = Envelope::completed("build", serde_json::json!({"target": "arm"}));

        write(&path, &envelope).unwrap();

        assert_eq!(read_envelope(&path).unwrap(), envelope);
        assert_eq!(decode_envelope(&encode(&envelope).unwrap()).unwrap(), envelope);
    }
}
