use quickcheck::{QuickCheck, TestResult};

use super::support::{assert_spans, ChunkReader};
use crate::{Decoder, Map, Value, ValueKind};

/// Property: a stream of multiple JSON roots round-trips through the
/// decoder at emit depth 0 regardless of how the reader chunks the bytes,
/// and the emitted spans tile the input left to right.
#[test]
fn multi_doc_roundtrip_quickcheck() {
    fn prop(values: Vec<Value>, chunk: usize) -> TestResult {
        if values.is_empty() {
            return TestResult::discard();
        }

        // Join all roots separated by a single space (valid JSON
        // whitespace), then feed the payload in small reads.
        let payload = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let chunk = 1 + chunk % 7;

        let mut decoder = Decoder::new(ChunkReader::new(payload.clone(), chunk), 0);
        let records: Vec<_> = decoder.stream().collect();
        if let Some(err) = decoder.err() {
            return TestResult::error(format!("decoder error {err} on {payload:?}"));
        }

        let got: Vec<Value> = records.iter().map(|mv| mv.value.clone()).collect();
        if got != values {
            return TestResult::failed();
        }
        if records.iter().any(|mv| mv.depth != 1) {
            return TestResult::failed();
        }
        assert_spans(&payload, &records);

        // Concatenating the spans reproduces the input minus the
        // separators.
        let tiled: String = records
            .iter()
            .map(|mv| &payload[mv.offset as usize..(mv.offset + mv.length) as usize])
            .collect();
        let expected: String = values.iter().map(ToString::to_string).collect();
        TestResult::from_bool(tiled == expected)
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<Value>, usize) -> TestResult);
}

/// Property: scan-only mode consumes the same input silently.
#[test]
fn scan_only_quickcheck() {
    fn prop(values: Vec<Value>) -> TestResult {
        let payload = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        let mut decoder = Decoder::new(payload.as_bytes(), -1);
        let count = decoder.stream().count();
        if decoder.err().is_some() {
            return TestResult::error(format!("decoder error on {payload:?}"));
        }
        TestResult::from_bool(count == 0)
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<Value>) -> TestResult);
}

/// Property: the elements of a root array come back in order at emit
/// depth 1.
#[test]
fn array_elements_roundtrip_quickcheck() {
    fn prop(values: Vec<Value>) -> TestResult {
        let payload = Value::Array(values.clone()).to_string();
        let mut decoder = Decoder::new(payload.as_bytes(), 1);
        let records: Vec<_> = decoder.stream().collect();
        if let Some(err) = decoder.err() {
            return TestResult::error(format!("decoder error {err} on {payload:?}"));
        }
        let got: Vec<Value> = records.iter().map(|mv| mv.value.clone()).collect();
        if records.iter().any(|mv| mv.depth != 1) {
            return TestResult::failed();
        }
        assert_spans(&payload, &records);
        TestResult::from_bool(got == values)
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<Value>) -> TestResult);
}

/// Property: in key-value mode, the pairs emitted from a root object are
/// exactly its entries.
#[test]
fn kv_pairs_match_object_quickcheck() {
    fn prop(entries: Vec<(String, Value)>) -> TestResult {
        let mut map = Map::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        let payload = Value::Object(map.clone()).to_string();

        let mut decoder = Decoder::new(payload.as_bytes(), 1).emit_kv();
        let records: Vec<_> = decoder.stream().collect();
        if let Some(err) = decoder.err() {
            return TestResult::error(format!("decoder error {err} on {payload:?}"));
        }

        let mut got = Map::new();
        for mv in &records {
            if mv.kind != ValueKind::KeyValue {
                return TestResult::failed();
            }
            let Value::KeyValue(kv) = &mv.value else {
                return TestResult::failed();
            };
            got.insert(kv.key.clone(), kv.value.clone());
        }
        assert_spans(&payload, &records);
        TestResult::from_bool(records.len() == map.len() && got == map)
    }
    QuickCheck::new().quickcheck(prop as fn(Vec<(String, Value)>) -> TestResult);
}
