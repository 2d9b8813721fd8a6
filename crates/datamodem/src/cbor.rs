//! Incremental decoder for the self-describing CBOR stream format.
//!
//! The decoder is a push parser: [`CborDecoder::read`] consumes a chunk
//! of bytes, advances the state machine as far as the chunk allows, and
//! suspends mid-token by buffering the pending prefix. Every multi-byte
//! field (magic, size, magnitude, float bits, string payload) follows the
//! same resumption rule: read whole from the input slice when it is fully
//! available and nothing is buffered, otherwise accumulate and continue
//! on the next call.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::buffer::ByteBuffer;
use crate::builder::TreeBuilder;
use crate::error::DecodeError;
use crate::options::DecoderOptions;
use crate::value::Value;

/// The self-describe tag every accepted stream opens with.
const MAGIC: [u8; 3] = [0xd9, 0xd9, 0xf7];

/// Grammar position between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the root value.
    Begin,
    /// Inside an array, before the next element.
    Array,
    /// Inside a map, before the next key.
    DictKey,
    /// Inside a map, between a key and its value.
    DictValue,
    /// Root value complete; trailing bytes are ignored.
    End,
}

/// The multi-byte field currently being accumulated, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Literal {
    None,
    /// The three magic bytes.
    Head,
    /// Definite-length char string payload.
    Chars,
    /// Definite-length byte string payload.
    Bytes,
    /// Indefinite-length char string; chunks run through [`Sequence`].
    CharSequence,
    /// Indefinite-length byte string; chunks run through [`Sequence`].
    ByteSequence,
    /// IEEE-754 float bits, 2, 4 or 8 bytes wide.
    Float,
    /// Extended unsigned magnitude.
    Unsigned,
    /// Extended negative magnitude.
    Negative,
    /// Extended tag value, read and discarded.
    Tag,
    /// Size field of a definite char string.
    CharSize,
    /// Size field of a definite byte string.
    ByteSize,
    /// Size field of a definite array already on the stack.
    ArraySize,
    /// Size field of a definite map already on the stack.
    DictSize,
}

/// Position inside one chunk of an indefinite-length string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sequence {
    /// Expecting a chunk header or the break byte.
    Head,
    /// Reading the chunk's extended size field.
    Size,
    /// Reading the chunk's payload.
    Value,
}

/// Reads big-endian magnitude fields of one to eight bytes.
fn be_uint(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

/// `2^e` built by exponent bits; every caller stays inside the normal
/// `f64` exponent range.
fn pow2(e: i32) -> f64 {
    f64::from_bits(u64::from(1023u32.wrapping_add_signed(e)) << 52)
}

/// Widens an IEEE-754 half-precision value, covering subnormals,
/// infinities and NaN.
fn half_to_double(h: u16) -> f64 {
    let frac = f64::from(h & 0x03ff);
    let exp = i32::from((h >> 10) & 0x1f);
    let mag = match exp {
        0 => frac * pow2(-24),
        31 => {
            if h & 0x03ff == 0 {
                f64::INFINITY
            } else {
                f64::NAN
            }
        }
        _ => (1024.0 + frac) * pow2(exp - 25),
    };
    if h & 0x8000 == 0 { mag } else { -mag }
}

/// An incremental decoder for CBOR byte streams.
///
/// Feed chunks with [`read`]; take the finished tree with [`finish`].
/// Splitting a stream differently never changes the result.
///
/// # Examples
///
/// ```rust
/// use datamodem::{CborDecoder, Value};
///
/// // [1], preceded by the self-describe tag
/// let bytes = [0xd9, 0xd9, 0xf7, 0x81, 0x01];
/// let mut dec = CborDecoder::new();
/// dec.read(&bytes[..2]).unwrap();
/// dec.read(&bytes[2..]).unwrap();
/// assert_eq!(dec.finish().unwrap(), Value::Array(vec![Value::Integer(1)]));
/// ```
///
/// [`read`]: CborDecoder::read
/// [`finish`]: CborDecoder::finish
#[derive(Debug)]
pub struct CborDecoder {
    state: State,
    literal: Literal,
    sequence: Sequence,
    /// Bytes still owed to the current literal or sequence chunk.
    remains: u64,
    buf: ByteBuffer,
    /// Accumulated payload of the current indefinite-length string.
    seq: Vec<u8>,
    /// A flushed map key waiting for its value.
    key: Option<String>,
    builder: TreeBuilder,
    options: DecoderOptions,
    err: Option<DecodeError>,
}

impl Default for CborDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CborDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            state: State::Begin,
            literal: Literal::Head,
            sequence: Sequence::Head,
            remains: MAGIC.len() as u64,
            buf: ByteBuffer::new(),
            seq: Vec::new(),
            key: None,
            builder: TreeBuilder::new(),
            options,
            err: None,
        }
    }

    /// Consumes one chunk of the stream.
    ///
    /// Always consumes the whole slice; `Ok(len)` means every byte was
    /// accepted (bytes after a complete root are ignored). The first
    /// malformed byte reports its error here exactly once and latches
    /// the decoder; later calls become no-ops.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] raised by the chunk.
    pub fn read(&mut self, bytes: &[u8]) -> Result<usize, DecodeError> {
        if self.err.is_some() {
            return Ok(bytes.len());
        }
        let mut input = bytes;
        match self.drive(&mut input) {
            Ok(()) => Ok(bytes.len()),
            Err(e) => {
                self.err = Some(e);
                Err(e)
            }
        }
    }

    /// Completes the stream and returns the root value.
    ///
    /// An indefinite-length string left open at a chunk boundary is
    /// closed by injecting the synthetic break byte first.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TruncatedInput`] if the stream ended mid-token or
    /// with containers still open; the latched error if one occurred.
    pub fn finish(mut self) -> Result<Value, DecodeError> {
        if let Some(e) = self.err {
            return Err(e);
        }
        if matches!(self.literal, Literal::CharSequence | Literal::ByteSequence)
            && self.sequence == Sequence::Head
        {
            let mut tail: &[u8] = &[0xff];
            if let Err(e) = self.drive(&mut tail) {
                return Err(e);
            }
        }
        self.settle();
        if self.literal == Literal::None {
            if let Some(root) = self.builder.take_root() {
                return Ok(root);
            }
        }
        Err(DecodeError::TruncatedInput)
    }

    /// Discards all progress; the decoder is ready for a new stream.
    pub fn clear(&mut self) {
        self.state = State::Begin;
        self.literal = Literal::Head;
        self.sequence = Sequence::Head;
        self.remains = MAGIC.len() as u64;
        self.buf.clear();
        self.seq.clear();
        self.key = None;
        self.builder.clear();
        self.err = None;
    }

    fn drive(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        while !r.is_empty() && self.state != State::End {
            match self.literal {
                Literal::CharSequence | Literal::ByteSequence => self.read_sequence(r)?,
                Literal::None => self.read_control(r)?,
                _ => {
                    if !self.read_literal(r)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_limit(&self, required: u64) -> Result<(), DecodeError> {
        let limit = self.options.max_literal_bytes;
        if required > limit as u64 {
            Err(DecodeError::LimitExceeded { required, limit })
        } else {
            Ok(())
        }
    }

    /// Pops every finished definite container, then realigns the grammar
    /// state with the new top of the stack.
    fn settle(&mut self) {
        let mut popped = false;
        while self.builder.top_remaining() == Some(Some(0)) {
            self.builder.pop();
            popped = true;
        }
        if popped {
            self.state = match self.builder.top_is_array() {
                Some(true) => State::Array,
                Some(false) => State::DictKey,
                None => State::End,
            };
        }
    }

    /// Stores a finished value at the current insertion point and moves
    /// the grammar state past it.
    fn place_value(&mut self, value: Value) {
        self.builder.place(self.key.take(), value);
        match self.state {
            State::DictValue => self.state = State::DictKey,
            State::Begin if self.builder.is_complete() => self.state = State::End,
            _ => {}
        }
    }

    /// Stores a finished scalar, routing it into the pending key slot
    /// when the grammar expects a map key.
    fn flush_scalar(&mut self, value: Value) {
        if self.state == State::DictKey {
            self.key = Some(match &value {
                Value::Integer(n) => n.to_string(),
                Value::Double(d) => d.to_string(),
                _ => String::new(),
            });
            self.state = State::DictValue;
        } else {
            self.place_value(value);
        }
    }

    /// Closes the innermost container on a break byte.
    fn close_indefinite(&mut self) -> Result<(), DecodeError> {
        if self.state == State::DictValue {
            // break after a key with no value
            return Err(DecodeError::UnexpectedToken(0xff));
        }
        match self.builder.top_remaining() {
            Some(None) => {
                self.builder.pop();
                self.state = match self.builder.top_is_array() {
                    Some(true) => State::Array,
                    Some(false) => State::DictKey,
                    None => State::End,
                };
                Ok(())
            }
            _ => Err(DecodeError::UnbalancedContainerClose),
        }
    }

    /// Handles one control byte: major type in the top 3 bits, additional
    /// info in the bottom 5.
    fn read_control(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        let v = r[0];
        *r = &r[1..];

        self.settle();
        if self.state == State::End {
            return Ok(());
        }
        let major = v >> 5;
        let info = v & 0x1f;

        // a tag prefixes its value, whose own control byte does the
        // counting
        if major != 6 && matches!(self.state, State::Array | State::DictValue) {
            self.builder.note_child();
        }

        if info == 31 {
            return match major {
                2 | 3 => {
                    self.literal = if major == 3 {
                        Literal::CharSequence
                    } else {
                        Literal::ByteSequence
                    };
                    self.sequence = Sequence::Head;
                    self.seq.clear();
                    Ok(())
                }
                4 | 5 => self.open_container(major == 4, None),
                7 => self.close_indefinite(),
                _ => Err(DecodeError::UnexpectedToken(v)),
            };
        }

        let ext = match info {
            0..=23 => None,
            24 => Some(1u64),
            25 => Some(2),
            26 => Some(4),
            27 => Some(8),
            _ => return Err(DecodeError::UnexpectedToken(v)),
        };

        match (major, ext) {
            (0, None) => {
                self.flush_scalar(Value::Integer(i64::from(info)));
                Ok(())
            }
            (1, None) => {
                self.flush_scalar(Value::Integer(-1 - i64::from(info)));
                Ok(())
            }
            (0, Some(n)) => self.start_literal(Literal::Unsigned, n),
            (1, Some(n)) => self.start_literal(Literal::Negative, n),
            (2, None) => self.start_literal(Literal::Bytes, u64::from(info)),
            (3, None) => self.start_literal(Literal::Chars, u64::from(info)),
            (2, Some(n)) => self.start_literal(Literal::ByteSize, n),
            (3, Some(n)) => self.start_literal(Literal::CharSize, n),
            (4, None) => self.open_container(true, Some(u64::from(info))),
            (5, None) => self.open_container(false, Some(u64::from(info))),
            (4, Some(n)) => {
                self.open_container(true, Some(0))?;
                self.start_literal(Literal::ArraySize, n)
            }
            (5, Some(n)) => {
                self.open_container(false, Some(0))?;
                self.start_literal(Literal::DictSize, n)
            }
            (6, None) => {
                // inline tag value, nothing follows it
                if self.state == State::DictKey {
                    Err(DecodeError::InvalidContainerKey)
                } else {
                    Ok(())
                }
            }
            (6, Some(n)) => {
                if self.state == State::DictKey {
                    Err(DecodeError::InvalidContainerKey)
                } else {
                    self.start_literal(Literal::Tag, n)
                }
            }
            (7, None) => match info {
                20 | 21 => {
                    if self.state == State::DictKey {
                        self.key = Some(if info == 21 { "true" } else { "false" }.into());
                        self.state = State::DictValue;
                    } else {
                        self.place_value(Value::Bool(info == 21));
                    }
                    Ok(())
                }
                22 | 23 => {
                    if self.state == State::DictKey {
                        self.key = Some(if info == 22 { "(null)" } else { "(undefined)" }.into());
                        self.state = State::DictValue;
                    } else {
                        self.place_value(Value::Null);
                    }
                    Ok(())
                }
                _ => Err(DecodeError::UnexpectedToken(v)),
            },
            (7, Some(n)) if n >= 2 => self.start_literal(Literal::Float, n),
            _ => Err(DecodeError::UnexpectedToken(v)),
        }
    }

    /// Arms a multi-byte literal; zero-length payloads flush immediately.
    fn start_literal(&mut self, literal: Literal, remains: u64) -> Result<(), DecodeError> {
        if matches!(literal, Literal::Chars | Literal::Bytes) {
            self.check_limit(remains)?;
        }
        self.literal = literal;
        self.remains = remains;
        if remains == 0 {
            return self.parse_field(&[]);
        }
        Ok(())
    }

    /// Opens an array or map at the current insertion point. `remaining`
    /// is `None` for indefinite length.
    fn open_container(
        &mut self,
        array: bool,
        remaining: Option<u64>,
    ) -> Result<(), DecodeError> {
        if self.state == State::DictKey {
            return Err(DecodeError::InvalidContainerKey);
        }
        let slot = self.key.take();
        if array {
            self.builder.push_array(remaining, slot);
            self.state = State::Array;
        } else {
            self.builder.push_dict(remaining, slot);
            self.state = State::DictKey;
        }
        Ok(())
    }

    /// Accumulates the current literal's bytes. Returns `Ok(false)` when
    /// the chunk ran out before the literal completed.
    fn read_literal(&mut self, r: &mut &[u8]) -> Result<bool, DecodeError> {
        if self.buf.is_empty() && r.len() as u64 >= self.remains {
            let n = usize::try_from(self.remains).unwrap_or(r.len());
            let (field, tail) = r.split_at(n);
            *r = tail;
            self.parse_field(field)?;
            return Ok(true);
        }

        let len = usize::try_from(self.remains.min(r.len() as u64)).unwrap_or(r.len());
        self.buf.put(&r[..len]);
        *r = &r[len..];
        self.remains -= len as u64;
        if self.remains > 0 {
            return Ok(false);
        }

        let field = self.buf.take();
        self.parse_field(&field)?;
        Ok(true)
    }

    /// Interprets one completed multi-byte field.
    fn parse_field(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        match self.literal {
            Literal::Head => {
                self.literal = Literal::None;
                if data == MAGIC {
                    Ok(())
                } else {
                    Err(DecodeError::UnexpectedToken(data[0]))
                }
            }
            Literal::ByteSize | Literal::CharSize => {
                let n = be_uint(data);
                let next = if self.literal == Literal::CharSize {
                    Literal::Chars
                } else {
                    Literal::Bytes
                };
                self.start_literal(next, n)
            }
            Literal::ArraySize => {
                self.builder.set_top_remaining(be_uint(data));
                self.literal = Literal::None;
                self.state = State::Array;
                Ok(())
            }
            Literal::DictSize => {
                self.builder.set_top_remaining(be_uint(data));
                self.literal = Literal::None;
                self.state = State::DictKey;
                Ok(())
            }
            Literal::Tag => {
                self.literal = Literal::None;
                Ok(())
            }
            Literal::Chars => {
                self.literal = Literal::None;
                let s = core::str::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
                if self.state == State::DictKey {
                    self.key = Some(s.into());
                    self.state = State::DictValue;
                } else {
                    self.place_value(Value::String(s.into()));
                }
                Ok(())
            }
            Literal::Bytes => {
                self.literal = Literal::None;
                if self.state == State::DictKey {
                    self.key = Some(BASE64.encode(data));
                    self.state = State::DictValue;
                } else {
                    self.place_value(Value::Bytes(data.to_vec()));
                }
                Ok(())
            }
            Literal::Unsigned => {
                self.literal = Literal::None;
                let n =
                    i64::try_from(be_uint(data)).map_err(|_| DecodeError::IntegerOverflow)?;
                self.flush_scalar(Value::Integer(n));
                Ok(())
            }
            Literal::Negative => {
                self.literal = Literal::None;
                let n =
                    i64::try_from(be_uint(data)).map_err(|_| DecodeError::IntegerOverflow)?;
                self.flush_scalar(Value::Integer(-1 - n));
                Ok(())
            }
            Literal::Float => {
                self.literal = Literal::None;
                let d = match *data {
                    [a, b] => half_to_double(u16::from_be_bytes([a, b])),
                    [a, b, c, e] => f64::from(f32::from_bits(u32::from_be_bytes([a, b, c, e]))),
                    [a, b, c, e, f, g, h, i] => {
                        f64::from_bits(u64::from_be_bytes([a, b, c, e, f, g, h, i]))
                    }
                    _ => 0.0,
                };
                self.flush_scalar(Value::Double(d));
                Ok(())
            }
            Literal::None | Literal::CharSequence | Literal::ByteSequence => Ok(()),
        }
    }

    /// Runs the sub-state machine of an indefinite-length string: chunk
    /// headers of the same string shape append to one accumulating node
    /// until the break byte.
    fn read_sequence(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        while !r.is_empty() {
            match self.sequence {
                Sequence::Head => {
                    let v = r[0];
                    *r = &r[1..];
                    if v == 0xff {
                        return self.finish_sequence();
                    }
                    let want = if self.literal == Literal::CharSequence { 3 } else { 2 };
                    if v >> 5 != want {
                        return Err(DecodeError::UnexpectedToken(v));
                    }
                    match v & 0x1f {
                        info @ 0..=23 => {
                            self.check_limit(self.seq.len() as u64 + u64::from(info))?;
                            self.remains = u64::from(info);
                            self.sequence = if info == 0 {
                                Sequence::Head
                            } else {
                                Sequence::Value
                            };
                        }
                        24 => {
                            self.remains = 1;
                            self.sequence = Sequence::Size;
                        }
                        25 => {
                            self.remains = 2;
                            self.sequence = Sequence::Size;
                        }
                        26 => {
                            self.remains = 4;
                            self.sequence = Sequence::Size;
                        }
                        27 => {
                            self.remains = 8;
                            self.sequence = Sequence::Size;
                        }
                        _ => return Err(DecodeError::UnexpectedToken(v)),
                    }
                }
                Sequence::Size => {
                    let len = usize::try_from(self.remains.min(r.len() as u64)).unwrap_or(r.len());
                    self.buf.put(&r[..len]);
                    *r = &r[len..];
                    self.remains -= len as u64;
                    if self.remains > 0 {
                        return Ok(());
                    }
                    let n = be_uint(self.buf.view());
                    self.buf.clear();
                    self.check_limit(self.seq.len() as u64 + n)?;
                    self.remains = n;
                    self.sequence = if n == 0 { Sequence::Head } else { Sequence::Value };
                }
                Sequence::Value => {
                    let len = usize::try_from(self.remains.min(r.len() as u64)).unwrap_or(r.len());
                    self.seq.extend_from_slice(&r[..len]);
                    *r = &r[len..];
                    self.remains -= len as u64;
                    if self.remains == 0 {
                        self.sequence = Sequence::Head;
                    }
                }
            }
        }
        Ok(())
    }

    /// Flushes the accumulated indefinite string on its break byte.
    fn finish_sequence(&mut self) -> Result<(), DecodeError> {
        let data = core::mem::take(&mut self.seq);
        let chars = self.literal == Literal::CharSequence;
        self.literal = Literal::None;
        self.sequence = Sequence::Head;
        if self.state == State::DictKey {
            let key = if chars {
                String::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?
            } else {
                BASE64.encode(&data)
            };
            self.key = Some(key);
            self.state = State::DictValue;
        } else if chars {
            let s = String::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
            self.place_value(Value::String(s));
        } else {
            self.place_value(Value::Bytes(data));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{CborDecoder, MAGIC, half_to_double};
    use crate::error::DecodeError;
    use crate::value::Value;

    fn with_magic(body: &[u8]) -> alloc::vec::Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn decodes_simple_root_values() {
        for (body, expected) in [
            (&[0xf5][..], Value::Bool(true)),
            (&[0xf4][..], Value::Bool(false)),
            (&[0xf6][..], Value::Null),
            (&[0xf7][..], Value::Null),
            (&[0x17][..], Value::Integer(23)),
            (&[0x20][..], Value::Integer(-1)),
        ] {
            let mut dec = CborDecoder::new();
            dec.read(&with_magic(body)).unwrap();
            assert_eq!(dec.finish().unwrap(), expected);
        }
    }

    #[test]
    fn rejects_missing_magic() {
        let mut dec = CborDecoder::new();
        assert_eq!(
            dec.read(&[0x81, 0x01, 0x00]),
            Err(DecodeError::UnexpectedToken(0x81))
        );
    }

    #[test]
    fn rejects_unassigned_info_values() {
        let mut dec = CborDecoder::new();
        // major 0, info 28
        assert_eq!(
            dec.read(&with_magic(&[0x1c])),
            Err(DecodeError::UnexpectedToken(0x1c))
        );
    }

    #[test]
    fn break_without_container_is_unbalanced() {
        let mut dec = CborDecoder::new();
        assert_eq!(
            dec.read(&with_magic(&[0xff])),
            Err(DecodeError::UnbalancedContainerClose)
        );
    }

    #[test]
    fn tag_values_are_discarded() {
        // tag 2 around 5
        let mut dec = CborDecoder::new();
        dec.read(&with_magic(&[0xc2, 0x05])).unwrap();
        assert_eq!(dec.finish().unwrap(), Value::Integer(5));
    }

    #[test]
    fn half_float_widening() {
        assert_eq!(half_to_double(0x3c00), 1.0);
        assert_eq!(half_to_double(0x3e00), 1.5);
        assert_eq!(half_to_double(0xc000), -2.0);
        assert_eq!(half_to_double(0x7bff), 65504.0);
        assert_eq!(half_to_double(0x0001), 5.960_464_477_539_063e-8);
        assert_eq!(half_to_double(0x7c00), f64::INFINITY);
        assert_eq!(half_to_double(0xfc00), f64::NEG_INFINITY);
        assert!(half_to_double(0x7e00).is_nan());
    }

    #[test]
    fn empty_string_at_chunk_end_completes() {
        let mut dec = CborDecoder::new();
        dec.read(&with_magic(&[0x60])).unwrap();
        assert_eq!(dec.finish().unwrap(), Value::String("".into()));
    }

    #[test]
    fn indefinite_string_closed_by_finish() {
        let mut dec = CborDecoder::new();
        dec.read(&with_magic(&[0x7f, 0x61, b'a', 0x61, b'b'])).unwrap();
        assert_eq!(dec.finish().unwrap(), Value::String("ab".into()));
    }

    #[test]
    fn truncated_stream_reports_on_finish() {
        let mut dec = CborDecoder::new();
        dec.read(&with_magic(&[0x82, 0x01])).unwrap();
        assert_eq!(dec.finish(), Err(DecodeError::TruncatedInput));
    }

    #[test]
    fn clear_resets_for_a_new_stream() {
        let mut dec = CborDecoder::new();
        assert!(dec.read(&[0x00, 0x11, 0x22]).is_err());
        dec.clear();
        dec.read(&with_magic(&[0x01])).unwrap();
        assert_eq!(dec.finish().unwrap(), Value::Integer(1));
    }

    #[test]
    fn nested_definite_containers() {
        // {"a": [1, 2], "b": {}}
        let body = [
            0xa2, 0x61, b'a', 0x82, 0x01, 0x02, 0x61, b'b', 0xa0,
        ];
        let mut dec = CborDecoder::new();
        dec.read(&with_magic(&body)).unwrap();
        let root = dec.finish().unwrap();
        let Value::Dict(map) = root else { panic!("expected map") };
        assert_eq!(
            map.get("a"),
            Some(&Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
        );
        assert_eq!(map.get("b"), Some(&Value::Dict(crate::value::Dict::new())));
    }
}
