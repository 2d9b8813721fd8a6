//! The construction stack both decoders build their tree through.
//!
//! Each open container is an owned frame on the stack; a container is
//! only moved into its parent when it closes. This keeps every insertion
//! an append to the top frame and never holds a reference into a
//! container that could reallocate underneath it.

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::{Array, Dict, Value};

#[derive(Debug)]
enum Open {
    Array(Array),
    Dict(Dict),
}

/// One open container: the container under construction, how many direct
/// children it still expects (`None` for indefinite length), and the map
/// key it will be inserted under when it closes.
#[derive(Debug)]
struct Frame {
    open: Open,
    remaining: Option<u64>,
    slot_key: Option<String>,
}

#[derive(Debug)]
pub(crate) struct TreeBuilder {
    root: Option<Value>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            root: None,
            stack: Vec::with_capacity(8),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.root = None;
        self.stack.clear();
    }

    /// `true` once a root value exists and every container has closed.
    pub(crate) fn is_complete(&self) -> bool {
        self.stack.is_empty() && self.root.is_some()
    }

    pub(crate) fn push_array(&mut self, remaining: Option<u64>, slot_key: Option<String>) {
        self.stack.push(Frame {
            open: Open::Array(Array::new()),
            remaining,
            slot_key,
        });
    }

    pub(crate) fn push_dict(&mut self, remaining: Option<u64>, slot_key: Option<String>) {
        self.stack.push(Frame {
            open: Open::Dict(Dict::new()),
            remaining,
            slot_key,
        });
    }

    /// Places a completed value at the current insertion point: appended
    /// to the open array, inserted into the open map under `key` (last
    /// write wins), or stored as the root when nothing is open.
    pub(crate) fn place(&mut self, key: Option<String>, value: Value) {
        match self.stack.last_mut() {
            Some(Frame {
                open: Open::Array(arr),
                ..
            }) => arr.push(value),
            Some(Frame {
                open: Open::Dict(map),
                ..
            }) => {
                map.insert(key.unwrap_or_default(), value);
            }
            None => self.root = Some(value),
        }
    }

    /// Decrements the expected-child count of the top frame, if it has
    /// one. Called once per control token that begins a direct child.
    pub(crate) fn note_child(&mut self) {
        if let Some(Frame {
            remaining: Some(n), ..
        }) = self.stack.last_mut()
        {
            *n = n.saturating_sub(1);
        }
    }

    /// Remaining-child count of the top frame; `None` when no container
    /// is open.
    pub(crate) fn top_remaining(&self) -> Option<Option<u64>> {
        self.stack.last().map(|f| f.remaining)
    }

    /// Replaces the top frame's expected-child count once a deferred size
    /// field has been decoded.
    pub(crate) fn set_top_remaining(&mut self, n: u64) {
        if let Some(frame) = self.stack.last_mut() {
            frame.remaining = Some(n);
        }
    }

    /// `Some(true)` when the top frame is an array, `Some(false)` for a
    /// map, `None` when the stack is empty.
    pub(crate) fn top_is_array(&self) -> Option<bool> {
        self.stack
            .last()
            .map(|f| matches!(f.open, Open::Array(..)))
    }

    /// Closes the top container, moving it into its parent (or the root).
    /// Returns `false` if no container was open.
    pub(crate) fn pop(&mut self) -> bool {
        let Some(frame) = self.stack.pop() else {
            return false;
        };
        let value = match frame.open {
            Open::Array(arr) => Value::Array(arr),
            Open::Dict(map) => Value::Dict(map),
        };
        self.place(frame.slot_key, value);
        true
    }

    /// The completed root, once every container has closed.
    pub(crate) fn take_root(&mut self) -> Option<Value> {
        if self.stack.is_empty() {
            self.root.take()
        } else {
            None
        }
    }
}
