//! Fixed-Width Frame Record

use crate::ExtractorError;
use std::fmt;

/// Width of one record in bytes.
///
/// Matches the extractor's scan window, so any frame the extractor can see
/// fits; also covers the 93-byte accelerometer payload the sensor emits.
pub const RECORD_LEN: usize = 100;

/// One extracted frame, zero-padded to [`RECORD_LEN`] bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    bytes: [u8; RECORD_LEN],
}

impl Default for Record {
    fn default() -> Self {
        Self {
            bytes: [0; RECORD_LEN],
        }
    }
}

impl Record {
    /// Build a record from frame bytes
    pub fn from_frame(frame: &[u8]) -> Result<Self, ExtractorError> {
        if frame.len() > RECORD_LEN {
            return Err(ExtractorError::FrameTooLong {
                len: frame.len(),
                max: RECORD_LEN,
            });
        }
        let mut record = Self::default();
        record.bytes[..frame.len()].copy_from_slice(frame);
        Ok(record)
    }

    /// Raw fixed-width block, padding included
    pub fn as_bytes(&self) -> &[u8; RECORD_LEN] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8; RECORD_LEN] {
        &mut self.bytes
    }

    /// Frame bytes up to the first NUL
    pub fn frame(&self) -> &[u8] {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(RECORD_LEN);
        &self.bytes[..end]
    }

    /// Length of the frame text
    pub fn frame_len(&self) -> usize {
        self.frame().len()
    }

    /// Frame text as UTF-8
    pub fn as_str(&self) -> Result<&str, ExtractorError> {
        Ok(std::str::from_utf8(self.frame())?)
    }

    /// Parse the frame as JSON
    pub fn to_json(&self) -> Result<serde_json::Value, ExtractorError> {
        Ok(serde_json::from_slice(self.frame())?)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.frame()))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record")
            .field(&String::from_utf8_lossy(self.frame()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"accel_amp_x": 0.0044, "accel_amp_y": 0.0023, "accel_amp_z": 0.0065, "temperature": 28.7593}"#;

    #[test]
    fn test_sample_payload_fits() {
        let record = Record::from_frame(SAMPLE.as_bytes()).unwrap();
        assert_eq!(record.frame_len(), SAMPLE.len());
        assert_eq!(record.as_str().unwrap(), SAMPLE);

        let json = record.to_json().unwrap();
        assert_eq!(json["temperature"], 28.7593);
    }

    #[test]
    fn test_padding_is_zeroed() {
        let record = Record::from_frame(b"{}").unwrap();
        assert_eq!(&record.as_bytes()[..2], b"{}");
        assert!(record.as_bytes()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_frame_too_long() {
        let err = Record::from_frame(&[b'x'; RECORD_LEN + 1]).unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::FrameTooLong { len, max } if len == RECORD_LEN + 1 && max == RECORD_LEN
        ));
    }

    #[test]
    fn test_non_json_is_reported() {
        let record = Record::from_frame(b"{oops").unwrap();
        assert!(matches!(record.to_json(), Err(ExtractorError::InvalidJson(_))));
        assert_eq!(record.to_string(), "{oops");
    }
}
