//! Incremental, resumable decoders for a self-describing binary (CBOR)
//! format and a JSON-like text format.
//!
//! Both decoders accept input in arbitrarily small, arbitrarily aligned
//! chunks, as bytes would arrive from a socket or a file reader, and
//! build an owned [`Value`] tree. A token split across chunk boundaries
//! is stitched back together internally; splitting one stream into any
//! sequence of non-empty chunks yields the same tree as decoding it in
//! one call.
//!
//! ```rust
//! use datamodem::{JsonDecoder, Value};
//!
//! let mut dec = JsonDecoder::new();
//! dec.read(br#"{"key": [null, tr"#).unwrap();
//! dec.read(br#"ue, 3.14]}"#).unwrap();
//! let root = dec.finish().unwrap();
//! assert!(root.is_dict());
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod builder;
mod cbor;
mod error;
mod json;
mod options;
mod value;

#[cfg(test)]
mod tests;

pub use cbor::CborDecoder;
pub use error::DecodeError;
pub use json::JsonDecoder;
pub use options::DecoderOptions;
pub use value::{Array, Dict, Value};
