//! Unit tests for `ConsoleCodec`

use bytes::BytesMut;
use headless_console::transport::ConsoleCodec;
use tokio_util::codec::{Decoder, Encoder};

fn decode_all(codec: &mut ConsoleCodec, input: &[u8]) -> Vec<String> {
    let mut buf = BytesMut::from(input);
    let mut lines = Vec::new();
    while let Some(line) = codec.decode(&mut buf).unwrap() {
        lines.push(line);
    }
    lines
}

#[test]
fn test_splits_lines_and_strips_terminators() {
    let mut codec = ConsoleCodec::new();
    let lines = decode_all(&mut codec, b"first\r\nsecond\nthird");
    assert_eq!(lines, vec!["first", "second"]);
}

#[test]
fn test_partial_line_waits_for_newline() {
    let mut codec = ConsoleCodec::new();
    let mut buf = BytesMut::from(&b"Name: Lob"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap(), None);

    buf.extend_from_slice(b"by\n");
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("Name: Lobby"));
}

#[test]
fn test_prompt_fragment_is_held_until_taken() {
    let mut codec = ConsoleCodec::new();
    let mut buf = BytesMut::from(&b"Lobby> "[..]);
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    assert_eq!(codec.take_prompt(&mut buf).as_deref(), Some("Lobby> "));
    assert!(buf.is_empty());

    buf.extend_from_slice(b"Name: Lobby\n");
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("Name: Lobby"));
}

#[test]
fn test_response_split_after_arrow_stays_one_line() {
    let mut codec = ConsoleCodec::new();
    let mut buf = BytesMut::from(&b"Role changed: User ->"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap(), None);

    buf.extend_from_slice(b" Admin\n");
    assert_eq!(
        codec.decode(&mut buf).unwrap().as_deref(),
        Some("Role changed: User -> Admin")
    );
}

#[test]
fn test_take_prompt_ignores_other_fragments() {
    let mut codec = ConsoleCodec::new();
    let mut buf = BytesMut::from(&b"first\nLoading wor"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("first"));
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    assert_eq!(codec.take_prompt(&mut buf), None);

    buf.extend_from_slice(b"ld\n");
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("Loading world"));
}

#[test]
fn test_partial_line_across_many_reads() {
    let mut codec = ConsoleCodec::new();
    let mut buf = BytesMut::new();
    for chunk in ["Us", "ers: ", "alice, ", "bob"] {
        buf.extend_from_slice(chunk.as_bytes());
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }
    buf.extend_from_slice(b"\nnext");
    assert_eq!(
        codec.decode(&mut buf).unwrap().as_deref(),
        Some("Users: alice, bob")
    );
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let mut codec = ConsoleCodec::new();
    let lines = decode_all(&mut codec, b"caf\xe9\n");
    assert_eq!(lines, vec!["caf\u{fffd}"]);
}

#[test]
fn test_overlong_line_is_discarded() {
    let mut codec = ConsoleCodec::with_max_length(8);
    let lines = decode_all(&mut codec, b"this line is far too long\nok\n");
    assert_eq!(lines, vec!["ok"]);
}

#[test]
fn test_overlong_fragment_is_discarded_across_reads() {
    let mut codec = ConsoleCodec::with_max_length(4);
    let mut buf = BytesMut::from(&b"0123456789"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap(), None);

    buf.extend_from_slice(b"tail\nnext\n");
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("next"));
}

#[test]
fn test_eof_flushes_remainder() {
    let mut codec = ConsoleCodec::new();
    let mut buf = BytesMut::from(&b"last words"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    assert_eq!(
        codec.decode_eof(&mut buf).unwrap().as_deref(),
        Some("last words")
    );
    assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
}

#[test]
fn test_encode_appends_newline() {
    let mut codec = ConsoleCodec::new();
    let mut dst = BytesMut::new();
    codec.encode("status", &mut dst).unwrap();
    codec.encode("", &mut dst).unwrap();
    assert_eq!(&dst[..], b"status\n\n");
}
