//! Line protocol spoken by the tilt sensor firmware.
//!
//! One reading per newline-terminated line, three decimal fields separated
//! by `/` in fixed order:
//!
//! ```text
//! <roll>/<pitch>/<yaw>\n      e.g.  3.21/-12.04/0.88
//! ```
//!
//! No checksum, no escaping. A trailing `\r` (CRLF peers) is stripped.

use crate::types::OrientationSample;
use std::collections::VecDeque;
use thiserror::Error;

/// Upper bound on buffered bytes while waiting for a newline. Wrong baud
/// rates produce endless unterminated garbage; the buffer must not grow
/// with it.
const MAX_PENDING_BYTES: usize = 4096;

/// Fields per reading: roll, pitch, yaw.
const FIELD_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("expected {FIELD_COUNT} '/'-separated fields, found {found}: {line:?}")]
    FieldCount { found: usize, line: String },
    #[error("non-numeric field {value:?} in line {line:?}")]
    BadNumber { value: String, line: String },
    #[error("no line terminator in {dropped} buffered bytes, input discarded")]
    Overflow { dropped: usize },
}

/// Streaming parser for the sensor line protocol.
///
/// Feed raw serial bytes via `push_data`, then drain parsed samples via
/// `next_sample`. Lines split across reads reassemble transparently.
pub struct LineParser {
    buffer: VecDeque<u8>,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(256),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Try to extract the next complete reading from the buffer.
    /// Returns `None` if no complete line is available yet.
    pub fn next_sample(&mut self) -> Option<Result<OrientationSample, ProtocolError>> {
        let newline = self.buffer.iter().position(|&b| b == b'\n');

        let Some(end) = newline else {
            if self.buffer.len() > MAX_PENDING_BYTES {
                let dropped = self.buffer.len();
                self.buffer.clear();
                return Some(Err(ProtocolError::Overflow { dropped }));
            }
            return None;
        };

        let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
        line.pop(); // the newline itself
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let text = String::from_utf8_lossy(&line);
        Some(parse_sample(text.trim()))
    }
}

/// Parse one complete line into an orientation sample.
pub fn parse_sample(line: &str) -> Result<OrientationSample, ProtocolError> {
    let fields: Vec<&str> = line.split('/').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ProtocolError::FieldCount {
            found: fields.len(),
            line: line.to_string(),
        });
    }

    let number = |field: &str| -> Result<f32, ProtocolError> {
        field.trim().parse::<f32>().map_err(|_| ProtocolError::BadNumber {
            value: field.trim().to_string(),
            line: line.to_string(),
        })
    };

    Ok(OrientationSample {
        roll: number(fields[0])?,
        pitch: number(fields[1])?,
        yaw: number(fields[2])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_line() {
        let mut parser = LineParser::new();
        parser.push_data(b"3.21/-12.04/0.88\n");

        let sample = parser.next_sample().unwrap().unwrap();
        assert_eq!(sample.roll, 3.21);
        assert_eq!(sample.pitch, -12.04);
        assert_eq!(sample.yaw, 0.88);

        // No more lines.
        assert!(parser.next_sample().is_none());
    }

    #[test]
    fn parse_fragmented_line() {
        let mut parser = LineParser::new();

        // Feed the line in three read-sized chunks.
        parser.push_data(b"10.5");
        assert!(parser.next_sample().is_none());
        parser.push_data(b"/20/3");
        assert!(parser.next_sample().is_none());
        parser.push_data(b"0\n");

        let sample = parser.next_sample().unwrap().unwrap();
        assert_eq!(sample.roll, 10.5);
        assert_eq!(sample.pitch, 20.0);
        assert_eq!(sample.yaw, 30.0);
    }

    #[test]
    fn parse_multiple_lines_in_one_push() {
        let mut parser = LineParser::new();
        parser.push_data(b"1/2/3\n4/5/6\n");

        let first = parser.next_sample().unwrap().unwrap();
        assert_eq!(first.roll, 1.0);

        let second = parser.next_sample().unwrap().unwrap();
        assert_eq!(second.roll, 4.0);

        assert!(parser.next_sample().is_none());
    }

    #[test]
    fn crlf_and_padding_are_tolerated() {
        let mut parser = LineParser::new();
        parser.push_data(b" 1.0 / -2.0 / 3.0 \r\n");

        let sample = parser.next_sample().unwrap().unwrap();
        assert_eq!(sample.roll, 1.0);
        assert_eq!(sample.pitch, -2.0);
        assert_eq!(sample.yaw, 3.0);
    }

    #[test]
    fn wrong_field_count_is_an_error() {
        assert!(matches!(
            parse_sample("bad/line"),
            Err(ProtocolError::FieldCount { found: 2, .. })
        ));
        // A trailing separator makes four fields, not three.
        assert!(matches!(
            parse_sample("1/2/3/"),
            Err(ProtocolError::FieldCount { found: 4, .. })
        ));
        assert!(matches!(
            parse_sample(""),
            Err(ProtocolError::FieldCount { found: 1, .. })
        ));
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        let err = parse_sample("1.0/abc/3.0").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BadNumber { ref value, .. } if value == "abc"
        ));
    }

    #[test]
    fn scientific_and_signed_values_parse() {
        let sample = parse_sample("+1.5e2/-0.25/1e-3").unwrap();
        assert_eq!(sample.roll, 150.0);
        assert_eq!(sample.pitch, -0.25);
        assert_eq!(sample.yaw, 0.001);
    }

    #[test]
    fn unterminated_noise_is_capped() {
        let mut parser = LineParser::new();
        parser.push_data(&[b'x'; MAX_PENDING_BYTES + 1]);

        assert!(matches!(
            parser.next_sample(),
            Some(Err(ProtocolError::Overflow { dropped })) if dropped == MAX_PENDING_BYTES + 1
        ));

        // The parser recovers once well-formed input resumes.
        parser.push_data(b"7/8/9\n");
        let sample = parser.next_sample().unwrap().unwrap();
        assert_eq!(sample.roll, 7.0);
    }
}
