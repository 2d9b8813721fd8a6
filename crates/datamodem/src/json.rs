//! Incremental decoder for the JSON-like text format.
//!
//! Same push-parser contract as the binary decoder: chunks of any size
//! and alignment, suspension mid-token through the growable buffer. The
//! grammar is lenient where the wire traffic is: stray commas between
//! items are skipped, trailing commas close cleanly, map keys may be
//! number or plain tokens, and the bare tokens `nan` and `inf` decode to
//! their floating-point values.

use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::ByteBuffer;
use crate::builder::TreeBuilder;
use crate::error::DecodeError;
use crate::options::DecoderOptions;
use crate::value::Value;

/// Single-character escape translations; zero marks an invalid escape.
/// `u` never reaches the table.
const ESCAPE: [u8; 256] = {
    let mut t = [0u8; 256];
    t[b'"' as usize] = b'"';
    t[b'\\' as usize] = b'\\';
    t[b'/' as usize] = b'/';
    t[b'b' as usize] = 0x08;
    t[b'f' as usize] = 0x0c;
    t[b'n' as usize] = b'\n';
    t[b'r' as usize] = b'\r';
    t[b't' as usize] = b'\t';
    t
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the root value.
    Begin,
    /// Inside an array, expecting an item (or a close).
    ArrayItem,
    /// Inside an array, after an item.
    ArrayNext,
    /// Inside a map, expecting a key (or a close).
    DictKey,
    /// Between a key and its colon.
    DictKeyValueSep,
    /// After the colon, expecting the value.
    DictValue,
    /// Inside a map, after a value.
    DictNext,
    /// Root value complete; trailing bytes are ignored.
    End,
}

/// The token currently being accumulated, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Literal {
    None,
    /// Inside a quoted string.
    Str,
    /// Just consumed a backslash.
    StrEscape,
    /// Inside `\uXXXX`, with this many hex digits already taken.
    StrUnicode(u8),
    /// Inside a number run.
    Number,
    /// Inside a bare alphanumeric token.
    Plain,
}

/// First-byte token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Str,
    Number,
    Plain,
    ArrayOpen,
    ArrayClose,
    DictOpen,
    DictClose,
    Colon,
    Comma,
}

fn classify(b: u8) -> Option<Token> {
    match b {
        b'"' => Some(Token::Str),
        b'0'..=b'9' | b'+' | b'-' => Some(Token::Number),
        b'[' => Some(Token::ArrayOpen),
        b']' => Some(Token::ArrayClose),
        b'{' => Some(Token::DictOpen),
        b'}' => Some(Token::DictClose),
        b':' => Some(Token::Colon),
        b',' => Some(Token::Comma),
        c if c.is_ascii_alphanumeric() => Some(Token::Plain),
        _ => None,
    }
}

fn is_number_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E')
}

fn hex_val(d: u8) -> u32 {
    match d {
        b'0'..=b'9' => u32::from(d - b'0'),
        b'a'..=b'f' => u32::from(d - b'a') + 10,
        _ => u32::from(d - b'A') + 10,
    }
}

/// Whole numbers inside the signed 64-bit range become integer nodes;
/// everything else stays a double.
fn number_value(d: f64) -> Value {
    // 2^63; exclusive above, inclusive below (both ends exactly
    // representable as f64)
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if d.is_finite() && d >= -BOUND && d < BOUND {
        #[allow(clippy::cast_possible_truncation)]
        let n = d as i64;
        #[allow(clippy::cast_precision_loss)]
        if (n as f64) == d {
            return Value::Integer(n);
        }
    }
    Value::Double(d)
}

/// An incremental decoder for JSON-like text streams.
///
/// Feed chunks with [`read`]; take the finished tree with [`finish`].
/// Splitting a stream differently never changes the result.
///
/// # Examples
///
/// ```rust
/// use datamodem::{JsonDecoder, Value};
///
/// let mut dec = JsonDecoder::new();
/// dec.read(br#"[1, "two"#).unwrap();
/// dec.read(br#"", 3.5]"#).unwrap();
/// let root = dec.finish().unwrap();
/// assert_eq!(
///     root,
///     Value::Array(vec![
///         Value::Integer(1),
///         Value::String("two".into()),
///         Value::Double(3.5),
///     ])
/// );
/// ```
///
/// [`read`]: JsonDecoder::read
/// [`finish`]: JsonDecoder::finish
#[derive(Debug)]
pub struct JsonDecoder {
    state: State,
    literal: Literal,
    /// A high surrogate waiting for its low half in the next escape.
    pending_surrogate: Option<u16>,
    buf: ByteBuffer,
    /// A flushed map key waiting for its value.
    key: Option<String>,
    builder: TreeBuilder,
    options: DecoderOptions,
    err: Option<DecodeError>,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            state: State::Begin,
            literal: Literal::None,
            pending_surrogate: None,
            buf: ByteBuffer::new(),
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
    /// A number or bare token pending at the end of input is flushed
    /// first; only the end of input can terminate a root-level `12` or
    /// `true`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TruncatedInput`] if the stream ended inside a
    /// string or with containers still open; the latched error if one
    /// occurred.
    pub fn finish(mut self) -> Result<Value, DecodeError> {
        if let Some(e) = self.err {
            return Err(e);
        }
        match self.literal {
            Literal::None => {}
            Literal::Number | Literal::Plain => {
                let token = self.buf.take();
                let number = self.literal == Literal::Number;
                self.literal = Literal::None;
                self.flush_run(&token, number)?;
            }
            _ => return Err(DecodeError::TruncatedInput),
        }
        if self.state == State::End {
            if let Some(root) = self.builder.take_root() {
                return Ok(root);
            }
        }
        Err(DecodeError::TruncatedInput)
    }

    /// Discards all progress; the decoder is ready for a new stream.
    pub fn clear(&mut self) {
        self.state = State::Begin;
        self.literal = Literal::None;
        self.pending_surrogate = None;
        self.buf.clear();
        self.key = None;
        self.builder.clear();
        self.err = None;
    }

    fn drive(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        if self.literal != Literal::None {
            self.read_literal(r)?;
        }
        loop {
            while let [b' ' | b'\t' | b'\r' | b'\n', rest @ ..] = *r {
                *r = rest;
            }
            if r.is_empty() || self.state == State::End {
                return Ok(());
            }
            self.step(r)?;
        }
    }

    /// Handles one token starting at `r[0]`.
    fn step(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        let b = r[0];
        let Some(token) = classify(b) else {
            return Err(DecodeError::UnexpectedToken(b));
        };
        match (self.state, token) {
            (State::Begin | State::ArrayItem | State::DictValue, Token::ArrayOpen) => {
                *r = &r[1..];
                self.builder.push_array(None, self.key.take());
                self.state = State::ArrayItem;
                Ok(())
            }
            (State::Begin | State::ArrayItem | State::DictValue, Token::DictOpen) => {
                *r = &r[1..];
                self.builder.push_dict(None, self.key.take());
                self.state = State::DictKey;
                Ok(())
            }
            (
                State::Begin | State::ArrayItem | State::DictKey | State::DictValue,
                Token::Str | Token::Number | Token::Plain,
            ) => {
                self.literal = match token {
                    Token::Str => {
                        *r = &r[1..];
                        Literal::Str
                    }
                    Token::Number => Literal::Number,
                    _ => Literal::Plain,
                };
                self.read_literal(r)
            }
            (State::DictKey, Token::ArrayOpen | Token::DictOpen) => {
                Err(DecodeError::InvalidContainerKey)
            }
            // stray commas between items are insignificant
            (
                State::ArrayItem | State::DictKey | State::DictKeyValueSep | State::DictValue,
                Token::Comma,
            ) => {
                *r = &r[1..];
                Ok(())
            }
            (State::ArrayNext, Token::Comma) => {
                *r = &r[1..];
                self.state = State::ArrayItem;
                Ok(())
            }
            (State::DictNext, Token::Comma) => {
                *r = &r[1..];
                self.state = State::DictKey;
                Ok(())
            }
            (State::ArrayItem | State::ArrayNext, Token::ArrayClose) => {
                *r = &r[1..];
                self.pop_container()
            }
            (
                State::DictKey | State::DictKeyValueSep | State::DictValue | State::DictNext,
                Token::DictClose,
            ) => {
                *r = &r[1..];
                // a dangling key with no value is dropped
                self.key = None;
                self.pop_container()
            }
            (State::DictKeyValueSep, Token::Colon) => {
                *r = &r[1..];
                self.state = State::DictValue;
                Ok(())
            }
            (State::Begin, Token::ArrayClose | Token::DictClose) => {
                Err(DecodeError::UnbalancedContainerClose)
            }
            _ => Err(DecodeError::UnexpectedToken(b)),
        }
    }

    fn pop_container(&mut self) -> Result<(), DecodeError> {
        if !self.builder.pop() {
            return Err(DecodeError::UnbalancedContainerClose);
        }
        self.state = match self.builder.top_is_array() {
            Some(true) => State::ArrayNext,
            Some(false) => State::DictNext,
            None => State::End,
        };
        Ok(())
    }

    /// Advances the pending literal as far as the chunk allows.
    fn read_literal(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        match self.literal {
            Literal::Number => self.parse_run(r, true),
            Literal::Plain => self.parse_run(r, false),
            Literal::None => Ok(()),
            _ => self.parse_string(r),
        }
    }

    fn buffer_bytes(&mut self, r: &mut &[u8], n: usize) -> Result<(), DecodeError> {
        self.buf.put(&r[..n]);
        *r = &r[n..];
        self.check_buf_limit()
    }

    fn check_buf_limit(&self) -> Result<(), DecodeError> {
        let limit = self.options.max_literal_bytes;
        if self.buf.len() > limit {
            Err(DecodeError::LimitExceeded {
                required: self.buf.len() as u64,
                limit,
            })
        } else {
            Ok(())
        }
    }

    fn parse_string(&mut self, r: &mut &[u8]) -> Result<(), DecodeError> {
        loop {
            match self.literal {
                Literal::Str => {
                    if r.is_empty() {
                        return Ok(());
                    }
                    if self.pending_surrogate.is_some() && r[0] != b'\\' {
                        return Err(DecodeError::InvalidEscape);
                    }
                    let Some(n) = r.iter().position(|b| matches!(b, b'"' | b'\\')) else {
                        return self.buffer_bytes(r, r.len());
                    };
                    if r[n] == b'"' {
                        if self.buf.is_empty() {
                            let (raw, rest) = r.split_at(n);
                            *r = &rest[1..];
                            self.check_limit(raw.len() as u64)?;
                            let raw = raw.to_vec();
                            self.flush_string(raw)?;
                        } else {
                            self.buffer_bytes(r, n)?;
                            *r = &r[1..];
                            let raw = self.buf.take();
                            self.flush_string(raw)?;
                        }
                        self.literal = Literal::None;
                        return Ok(());
                    }
                    self.buffer_bytes(r, n)?;
                    *r = &r[1..];
                    self.literal = Literal::StrEscape;
                }
                Literal::StrEscape => {
                    if r.is_empty() {
                        return Ok(());
                    }
                    let c = r[0];
                    *r = &r[1..];
                    if c == b'u' {
                        self.literal = Literal::StrUnicode(0);
                    } else {
                        if self.pending_surrogate.is_some() {
                            return Err(DecodeError::InvalidEscape);
                        }
                        let e = ESCAPE[usize::from(c)];
                        if e == 0 {
                            return Err(DecodeError::InvalidEscape);
                        }
                        self.buf.put_u8(e);
                        self.check_buf_limit()?;
                        self.literal = Literal::Str;
                    }
                }
                Literal::StrUnicode(seen) => {
                    if r.is_empty() {
                        return Ok(());
                    }
                    let c = r[0];
                    *r = &r[1..];
                    if !c.is_ascii_hexdigit() {
                        return Err(DecodeError::InvalidEscape);
                    }
                    self.buf.put_u8(c);
                    if seen == 3 {
                        self.flush_unicode_escape()?;
                        self.literal = Literal::Str;
                    } else {
                        self.literal = Literal::StrUnicode(seen + 1);
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Resolves one complete `\uXXXX` escape, combining surrogate pairs
    /// into a single scalar.
    fn flush_unicode_escape(&mut self) -> Result<(), DecodeError> {
        let c = {
            let digits = self.buf.pop(4);
            digits.iter().fold(0u32, |acc, d| (acc << 4) | hex_val(*d))
        };
        let scalar = if let Some(high) = self.pending_surrogate.take() {
            if (0xdc00..=0xdfff).contains(&c) {
                0x10000 + ((u32::from(high) - 0xd800) << 10) + (c - 0xdc00)
            } else {
                return Err(DecodeError::InvalidEscape);
            }
        } else if (0xd800..=0xdbff).contains(&c) {
            self.pending_surrogate = u16::try_from(c).ok();
            return Ok(());
        } else if (0xdc00..=0xdfff).contains(&c) {
            // low surrogate with no preceding high half
            return Err(DecodeError::InvalidEscape);
        } else {
            c
        };
        let ch = char::from_u32(scalar).ok_or(DecodeError::InvalidEscape)?;
        let mut utf8 = [0u8; 4];
        self.buf.put(ch.encode_utf8(&mut utf8).as_bytes());
        self.check_buf_limit()
    }

    /// Accumulates a number or plain token; the token only ends at a
    /// byte outside its class, so a chunk ending mid-run suspends.
    fn parse_run(&mut self, r: &mut &[u8], number: bool) -> Result<(), DecodeError> {
        let stop = |b: &u8| {
            if number {
                !is_number_byte(*b)
            } else {
                !b.is_ascii_alphanumeric()
            }
        };
        let Some(n) = r.iter().position(stop) else {
            return self.buffer_bytes(r, r.len());
        };
        if self.buf.is_empty() {
            let (token, rest) = r.split_at(n);
            *r = rest;
            self.check_limit(token.len() as u64)?;
            let token = token.to_vec();
            self.literal = Literal::None;
            self.flush_run(&token, number)
        } else {
            self.buffer_bytes(r, n)?;
            let token = self.buf.take();
            self.literal = Literal::None;
            self.flush_run(&token, number)
        }
    }

    fn check_limit(&self, required: u64) -> Result<(), DecodeError> {
        let limit = self.options.max_literal_bytes;
        if required > limit as u64 {
            Err(DecodeError::LimitExceeded { required, limit })
        } else {
            Ok(())
        }
    }

    /// Routes a completed string literal to the key slot or the tree.
    fn flush_string(&mut self, raw: Vec<u8>) -> Result<(), DecodeError> {
        let s = String::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
        if self.state == State::DictKey {
            self.key = Some(s);
            self.state = State::DictKeyValueSep;
        } else {
            self.place_token(Value::String(s));
        }
        Ok(())
    }

    /// Interprets a completed number or plain token. In key position the
    /// raw token text becomes the key.
    fn flush_run(&mut self, token: &[u8], number: bool) -> Result<(), DecodeError> {
        if self.state == State::DictKey {
            let s = core::str::from_utf8(token).map_err(|_| DecodeError::InvalidUtf8)?;
            self.key = Some(s.into());
            self.state = State::DictKeyValueSep;
            return Ok(());
        }
        let value = if number {
            let s = core::str::from_utf8(token).map_err(|_| DecodeError::InvalidUtf8)?;
            let d: f64 = s
                .parse()
                .map_err(|_| DecodeError::UnexpectedToken(token[0]))?;
            number_value(d)
        } else {
            match token {
                b"true" => Value::Bool(true),
                b"false" => Value::Bool(false),
                b"null" => Value::Null,
                b"nan" => Value::Double(f64::NAN),
                b"inf" => Value::Double(f64::INFINITY),
                _ => return Err(DecodeError::UnexpectedToken(token[0])),
            }
        };
        self.place_token(value);
        Ok(())
    }

    /// Stores a finished value and moves the grammar state past it.
    fn place_token(&mut self, value: Value) {
        match self.state {
            State::Begin => {
                self.builder.place(None, value);
                self.state = State::End;
            }
            State::ArrayItem => {
                self.builder.place(None, value);
                self.state = State::ArrayNext;
            }
            State::DictValue => {
                self.builder.place(self.key.take(), value);
                self.state = State::DictNext;
            }
            _ => {}
        }
    }
}
