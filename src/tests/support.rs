//! Reader fixtures and span assertions shared by the decoder tests.
use std::io::{self, Read};

use crate::{Map, MetaValue, Value, ValueKind};

/// Hands out the payload in fixed-size chunks, forcing the scanner to
/// refill mid-token.
pub struct ChunkReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        assert!(chunk > 0, "chunk size must be non-zero");
        Self {
            data: data.into(),
            pos: 0,
            chunk,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            return Ok(0);
        }
        let n = self.chunk.min(remaining).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Repeats a single byte `fail_after` times, then fails every read.
pub struct FailingReader {
    byte: u8,
    fail_after: usize,
    served: usize,
}

impl FailingReader {
    pub fn new(fail_after: usize, byte: u8) -> Self {
        Self {
            byte,
            fail_after,
            served: 0,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served >= self.fail_after {
            return Err(io::Error::new(io::ErrorKind::Other, "mock reader failure"));
        }
        let n = buf.len().min(self.fail_after - self.served);
        buf[..n].fill(self.byte);
        self.served += n;
        Ok(n)
    }
}

/// Converts a `serde_json` tree into this crate's value model, with
/// numbers widened to doubles.
pub fn from_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(a) => Value::Array(a.iter().map(from_json).collect()),
        serde_json::Value::Object(m) => Value::Object(
            m.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

/// Checks the span contract over a run of emitted records: spans are
/// non-overlapping and monotonic, and each span reparses (via
/// `serde_json`) to a value structurally equal to the record's. Key-value
/// spans cover `"key":value` and are checked wrapped in braces.
pub fn assert_spans(input: &str, records: &[MetaValue]) {
    let mut last_end = 0u64;
    for mv in records {
        assert!(mv.length >= 1, "empty span in {mv:?}");
        assert!(
            mv.offset >= last_end,
            "span of {mv:?} overlaps its predecessor"
        );
        last_end = mv.offset + mv.length;
        let span = &input.as_bytes()[mv.offset as usize..(mv.offset + mv.length) as usize];
        if let Value::KeyValue(kv) = &mv.value {
            assert_eq!(mv.kind, ValueKind::KeyValue);
            let text = std::str::from_utf8(span).expect("key-value span is UTF-8");
            let reparsed = serde_json::from_str(&format!("{{{text}}}"))
                .expect("key-value span reparses inside braces");
            let mut expected = Map::new();
            expected.insert(kv.key.clone(), kv.value.clone());
            assert_eq!(from_json(&reparsed), Value::Object(expected));
        } else {
            let reparsed = serde_json::from_slice(span).expect("span reparses as JSON");
            assert_eq!(from_json(&reparsed), mv.value, "span mismatch for {mv:?}");
        }
    }
}
