//! Line-oriented Server-Sent Events (SSE) parser
//!
//! Chat completion streams put one JSON payload on each `data: ` line. This
//! parser only splits lines and classifies them; blank-line event framing,
//! `event:` and `id:` fields carry nothing the decoder needs.

use tracing::trace;

/// Marker that prefixes every payload line
pub const DATA_PREFIX: &[u8] = b"data: ";

/// Payload that marks the end of a stream segment
pub const DONE_MARKER: &str = "[DONE]";

/// A complete line that carried data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Payload of a `data: ` line, prefix stripped
    Data(String),

    /// The `[DONE]` sentinel
    Done,
}

impl SseLine {
    /// Classify one complete line, without its terminator
    ///
    /// Returns `None` for comments, keep-alives, blank lines and other fields.
    fn classify(line: &[u8]) -> Option<Self> {
        let payload = line.strip_prefix(DATA_PREFIX)?;
        let payload = String::from_utf8_lossy(payload);
        if payload == DONE_MARKER {
            Some(Self::Done)
        } else {
            Some(Self::Data(payload.into_owned()))
        }
    }
}

/// Incremental line splitter over raw stream bytes
///
/// Bytes are buffered undecoded so a UTF-8 sequence split across reads is
/// whole again by the time its line is complete. Only the unterminated tail
/// is kept between calls.
#[derive(Debug, Default)]
pub struct SseParser {
    /// Bytes of the current, unterminated line
    buffer: Vec<u8>,

    /// Prefix of `buffer` already known to contain no `\n`
    scanned: usize,
}

impl SseParser {
    /// Create a new SSE parser
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chunk of stream bytes
    ///
    /// Returns the data lines completed by this chunk, in order. A line is
    /// never returned before its `\n` has been seen.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Vec<SseLine> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;

        while let Some(offset) = self.buffer[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset;
            let line = &self.buffer[start..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            if let Some(parsed) = SseLine::classify(line) {
                lines.push(parsed);
            }

            start = end + 1;
            search_from = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        lines
    }

    /// Number of buffered bytes waiting for a line terminator
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any unterminated trailing line
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            trace!(bytes = self.buffer.len(), "discarding unterminated trailing line");
        }
        self.buffer.clear();
        self.scanned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_data_lines() {
        let mut parser = SseParser::new();
        let lines = parser.parse_chunk(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n");

        assert_eq!(
            lines,
            vec![
                SseLine::Data(r#"{"a":1}"#.to_string()),
                SseLine::Data(r#"{"b":2}"#.to_string()),
            ]
        );
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_ignore_non_data_lines() {
        let mut parser = SseParser::new();
        let lines = parser.parse_chunk(b": keep-alive\nevent: message\nid: 7\ndata:nospace\ndata: real\n");
        assert_eq!(lines, vec![SseLine::Data("real".to_string())]);
    }

    #[test]
    fn test_parse_done_marker() {
        let mut parser = SseParser::new();
        let lines = parser.parse_chunk(b"data: [DONE]\n\n");
        assert_eq!(lines, vec![SseLine::Done]);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut parser = SseParser::new();
        let lines = parser.parse_chunk(b"data: x\r\ndata: [DONE]\r\n");
        assert_eq!(lines, vec![SseLine::Data("x".to_string()), SseLine::Done]);
    }

    #[test]
    fn test_incomplete_line_is_buffered() {
        let mut parser = SseParser::new();

        assert!(parser.parse_chunk(b"data: par").is_empty());
        assert_eq!(parser.pending(), 9);

        assert!(parser.parse_chunk(b"tial").is_empty());

        let lines = parser.parse_chunk(b"\n");
        assert_eq!(lines, vec![SseLine::Data("partial".to_string())]);
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_split_inside_prefix() {
        let mut parser = SseParser::new();
        assert!(parser.parse_chunk(b"da").is_empty());
        assert!(parser.parse_chunk(b"ta").is_empty());
        let lines = parser.parse_chunk(b": ok\n");
        assert_eq!(lines, vec![SseLine::Data("ok".to_string())]);
    }

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "data: héllo\n".as_bytes();
        let split = bytes.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut parser = SseParser::new();
        assert!(parser.parse_chunk(&bytes[..split]).is_empty());
        let lines = parser.parse_chunk(&bytes[split..]);
        assert_eq!(lines, vec![SseLine::Data("héllo".to_string())]);
    }

    #[test]
    fn test_finish_discards_tail() {
        let mut parser = SseParser::new();
        parser.parse_chunk(b"data: never terminated");
        parser.finish();
        assert_eq!(parser.pending(), 0);
        assert!(parser.parse_chunk(b"\n").is_empty());
    }
}
