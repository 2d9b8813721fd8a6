use alloc::string::{String, ToString};
use alloc::{vec, vec::Vec};

use rstest::rstest;

use super::encode::{MAGIC, encode, head};
use crate::{CborDecoder, Dict, JsonDecoder, Value};

fn decode_cbor(bytes: &[u8]) -> Value {
    let mut dec = CborDecoder::new();
    dec.read(bytes).unwrap();
    dec.finish().unwrap()
}

fn decode_cbor_body(body: &[u8]) -> Value {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(body);
    decode_cbor(&bytes)
}

fn decode_json(text: &str) -> Value {
    let mut dec = JsonDecoder::new();
    dec.read(text.as_bytes()).unwrap();
    dec.finish().unwrap()
}

#[rstest]
#[case(0)]
#[case(23)]
#[case(24)]
#[case(255)]
#[case(256)]
#[case(65_535)]
#[case(65_536)]
#[case(4_294_967_295)]
#[case(4_294_967_296)]
#[case(i64::MAX)]
fn cbor_integer_size_classes(#[case] n: i64) {
    assert_eq!(decode_cbor(&encode(&Value::Integer(n))), Value::Integer(n));
    // the matching negative crosses the same head-width boundary
    assert_eq!(
        decode_cbor(&encode(&Value::Integer(-1 - n))),
        Value::Integer(-1 - n)
    );
}

#[rstest]
#[case(&[0xf9, 0x3c, 0x00], 1.0)]
#[case(&[0xf9, 0x3e, 0x00], 1.5)]
#[case(&[0xf9, 0xc0, 0x00], -2.0)]
#[case(&[0xf9, 0x7b, 0xff], 65_504.0)]
#[case(&[0xfa, 0x3f, 0xc0, 0x00, 0x00], 1.5)]
#[case(&[0xfa, 0xc2, 0xc8, 0x00, 0x00], -100.0)]
#[case(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a], 1.1)]
fn cbor_float_widths(#[case] body: &[u8], #[case] expected: f64) {
    assert_eq!(decode_cbor_body(body), Value::Double(expected));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn cbor_indefinite_text_string(#[case] chunks: usize) {
    let mut body = vec![0x7f];
    let mut expected = String::new();
    for i in 0..chunks {
        let chunk = "x".repeat(i + 1);
        body.extend(head(3, chunk.len() as u64));
        body.extend_from_slice(chunk.as_bytes());
        expected.push_str(&chunk);
    }
    body.push(0xff);
    assert_eq!(decode_cbor_body(&body), Value::String(expected));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn cbor_indefinite_byte_string(#[case] chunks: usize) {
    let mut body = vec![0x5f];
    let mut expected = Vec::new();
    for i in 0..chunks {
        let chunk = vec![i as u8; i + 1];
        body.extend(head(2, chunk.len() as u64));
        body.extend_from_slice(&chunk);
        expected.extend_from_slice(&chunk);
    }
    body.push(0xff);
    assert_eq!(decode_cbor_body(&body), Value::Bytes(expected));
}

#[test]
fn cbor_indefinite_containers() {
    // [_ 1, 2]
    assert_eq!(
        decode_cbor_body(&[0x9f, 0x01, 0x02, 0xff]),
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );
    // {_ "a": 1}
    let root = decode_cbor_body(&[0xbf, 0x61, b'a', 0x01, 0xff]);
    assert_eq!(root.to_string(), r#"{"a":1}"#);
    // [_ ] and {_ }
    assert_eq!(decode_cbor_body(&[0x9f, 0xff]), Value::Array(vec![]));
    assert_eq!(decode_cbor_body(&[0xbf, 0xff]), Value::Dict(Dict::new()));
}

#[test]
fn cbor_empty_values() {
    assert_eq!(decode_cbor_body(&[0x80]), Value::Array(vec![]));
    assert_eq!(decode_cbor_body(&[0xa0]), Value::Dict(Dict::new()));
    assert_eq!(decode_cbor_body(&[0x60]), Value::String(String::new()));
    assert_eq!(decode_cbor_body(&[0x40]), Value::Bytes(vec![]));
}

#[rstest]
// tag 42 with a one-byte extension
#[case(&[0xd8, 0x2a, 0x05])]
// tag 1 inline
#[case(&[0xc1, 0x05])]
// tag with an eight-byte extension
#[case(&[0xdb, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x05])]
fn cbor_tags_are_transparent(#[case] body: &[u8]) {
    assert_eq!(decode_cbor_body(body), Value::Integer(5));
}

#[test]
fn cbor_tagged_element_counts_once() {
    // [tag(2) 1, 2]
    assert_eq!(
        decode_cbor_body(&[0x82, 0xc2, 0x01, 0x02]),
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );
    // {"a": tag(2) 1}
    let root = decode_cbor_body(&[0xa1, 0x61, b'a', 0xc2, 0x01]);
    assert_eq!(root.to_string(), r#"{"a":1}"#);
}

#[test]
fn cbor_map_keys_are_stringified() {
    let body = [
        0xa8, // 8 entries
        0x01, 0x00, // 1: 0
        0x20, 0x01, // -1: 1
        0xf9, 0x3e, 0x00, 0x02, // 1.5: 2
        0xf4, 0x03, // false: 3
        0xf5, 0x04, // true: 4
        0xf6, 0x05, // null: 5
        0xf7, 0x06, // undefined: 6
        0x42, 0xde, 0xad, 0x07, // h'dead': 7
    ];
    let Value::Dict(map) = decode_cbor_body(&body) else {
        panic!("expected map");
    };
    assert_eq!(map.len(), 8);
    assert_eq!(map.get("1"), Some(&Value::Integer(0)));
    assert_eq!(map.get("-1"), Some(&Value::Integer(1)));
    assert_eq!(map.get("1.5"), Some(&Value::Integer(2)));
    assert_eq!(map.get("false"), Some(&Value::Integer(3)));
    assert_eq!(map.get("true"), Some(&Value::Integer(4)));
    assert_eq!(map.get("(null)"), Some(&Value::Integer(5)));
    assert_eq!(map.get("(undefined)"), Some(&Value::Integer(6)));
    assert_eq!(map.get("3q0="), Some(&Value::Integer(7)));
}

#[test]
fn cbor_indefinite_string_as_map_key() {
    // {(_ "a" "b"): 1}
    let body = [0xa1, 0x7f, 0x61, b'a', 0x61, b'b', 0xff, 0x01];
    let root = decode_cbor_body(&body);
    assert_eq!(root.to_string(), r#"{"ab":1}"#);
}

#[test]
fn cbor_map_key_collision_keeps_last() {
    let body = [0xa2, 0x61, b'a', 0x01, 0x61, b'a', 0x02];
    let Value::Dict(map) = decode_cbor_body(&body) else {
        panic!("expected map");
    };
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("a"), Some(&Value::Integer(2)));
}

#[test]
fn cbor_round_trip_three_deep() {
    let mut inner = Dict::new();
    inner.insert("xs".into(), Value::Array(vec![Value::Integer(-300), Value::Null]));
    inner.insert("flag".into(), Value::Bool(true));
    let mut outer = Dict::new();
    outer.insert("inner".into(), Value::Dict(inner));
    outer.insert("blob".into(), Value::Bytes(vec![0, 1, 2, 255]));
    let value = Value::Array(vec![
        Value::Dict(outer),
        Value::Double(2.5),
        Value::String("end".into()),
    ]);
    assert_eq!(decode_cbor(&encode(&value)), value);
}

#[test]
fn json_round_trip_via_display() {
    let mut inner = Dict::new();
    inner.insert("xs".into(), Value::Array(vec![Value::Integer(1), Value::Null]));
    inner.insert("s".into(), Value::String("a\"b\\c\n".into()));
    let mut outer = Dict::new();
    outer.insert("inner".into(), Value::Dict(inner));
    outer.insert("d".into(), Value::Double(-0.5));
    let value = Value::Array(vec![Value::Dict(outer), Value::Bool(false)]);
    assert_eq!(decode_json(&value.to_string()), value);
}

#[test]
fn json_map_key_collision_keeps_last() {
    let Value::Dict(map) = decode_json(r#"{"a": 1, "b": 0, "a": 2}"#) else {
        panic!("expected map");
    };
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a"), Some(&Value::Integer(2)));
}

#[rstest]
#[case("0", Value::Integer(0))]
#[case("+5", Value::Integer(5))]
#[case("-17", Value::Integer(-17))]
#[case("1e3", Value::Integer(1000))]
#[case("3.25", Value::Double(3.25))]
#[case("-2.5e-1", Value::Double(-0.25))]
#[case("9223372036854775807", Value::Double(9.223_372_036_854_776e18))]
fn json_number_interpretation(#[case] text: &str, #[case] expected: Value) {
    assert_eq!(decode_json(text), expected);
}

#[test]
fn json_escape_sequences() {
    assert_eq!(
        decode_json(r#""\n\t\\\"""#),
        Value::String("\n\t\\\"".into())
    );
    assert_eq!(decode_json(r#""\b\f\r\/""#), Value::String("\u{8}\u{c}\r/".into()));
}

#[test]
fn cbor_decoder_reuse_after_clear() {
    let mut dec = CborDecoder::new();
    dec.read(&encode(&Value::Integer(1))).unwrap();
    dec.clear();
    dec.read(&encode(&Value::Integer(2))).unwrap();
    assert_eq!(dec.finish().unwrap(), Value::Integer(2));
}

#[test]
fn json_decoder_reuse_after_clear() {
    let mut dec = JsonDecoder::new();
    dec.read(b"[1, 2").unwrap();
    dec.clear();
    dec.read(b"[3]").unwrap();
    assert_eq!(dec.finish().unwrap(), Value::Array(vec![Value::Integer(3)]));
}
