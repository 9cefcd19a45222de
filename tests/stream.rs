//! End-to-end checks of the public decoding surface.
#![allow(missing_docs)]

use jsonflume::{Decoder, Error, Value, ValueKind};

const LOG: &str = r#"{"level":"info","msg":"started","code":0}
{"level":"warn","msg":"slow request","code":null}
{"level":"error","msg":"gave up","code":-1}
"#;

#[test]
fn top_level_records_tile_the_input() {
    let mut decoder = Decoder::new(LOG.as_bytes(), 0);
    let records: Vec<_> = decoder.stream().collect();
    assert!(decoder.err().is_none());
    assert_eq!(records.len(), 3);

    let mut last_end = 0;
    for record in &records {
        assert_eq!(record.kind, ValueKind::Object);
        assert_eq!(record.depth, 1);
        assert!(record.offset >= last_end);
        last_end = record.offset + record.length;

        let span = &LOG.as_bytes()[record.offset as usize..last_end as usize];
        assert_eq!(span.first(), Some(&b'{'));
        assert_eq!(span.last(), Some(&b'}'));
    }
}

#[test]
fn kv_mode_pairs_members_with_keys() {
    let mut decoder = Decoder::new(LOG.as_bytes(), 1).emit_kv();
    let mut pairs = Vec::new();
    for mv in decoder.stream() {
        let Value::KeyValue(kv) = mv.value else {
            panic!("expected key-value record, got {:?}", mv.kind);
        };
        pairs.push((kv.key, kv.value));
    }
    assert!(decoder.err().is_none());

    assert_eq!(pairs.len(), 9);
    assert_eq!(pairs[0], ("level".into(), Value::String("info".into())));
    assert_eq!(pairs[5], ("code".into(), Value::Null));
    assert_eq!(pairs[8], ("code".into(), Value::Number(-1.0)));
}

#[test]
fn push_mode_cancellation_is_exact() {
    let mut seen = Vec::new();
    let mut decoder = Decoder::new(LOG.as_bytes(), 0);
    let result = decoder.decode(|mv| {
        seen.push(mv);
        seen.len() < 2
    });
    assert!(matches!(result, Err(Error::Canceled)));
    assert_eq!(seen.len(), 2);
}

#[test]
fn configuration_is_chainable() {
    let mut decoder = Decoder::new(LOG.as_bytes(), 1).emit_kv().max_depth(8);
    assert_eq!(decoder.stream().count(), 9);
    assert!(decoder.err().is_none());
}

#[test]
fn depth_limit_is_a_terminal_error() {
    let body = "[[[[[1]]]]]";
    let mut decoder = Decoder::new(body.as_bytes(), -1).max_depth(2);
    assert_eq!(decoder.stream().count(), 0);
    match decoder.err() {
        Some(Error::MaxDepth(limit)) => assert_eq!(*limit, 2),
        other => panic!("expected max-depth error, got {other:?}"),
    }
}
