//! Variable scope management for template rendering.
//!
//! A [`ScopeStack`] holds an ordered list of frames:
//! - the base frame carries the caller's data context and is never popped
//! - loop iterations push a frame binding the item (and index) variables
//! - lookups search from the innermost frame outwards, first match wins

use serde_json::{Map, Value};

/// One layer of variable bindings.
pub type Frame = Map<String, Value>;

/// Stack of variable frames. The last element is the innermost scope.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Create a stack with one empty base frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new()],
        }
    }

    /// Create a stack whose base frame is `base`.
    pub fn with_base(base: Frame) -> Self {
        Self {
            frames: vec![base],
        }
    }

    /// Push a new empty frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Push a pre-filled frame.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame.
    ///
    /// Panics when only the base frame is left: every push is paired with
    /// exactly one pop, so popping the base is a logic error.
    pub fn pop(&mut self) -> Frame {
        if self.frames.len() > 1 {
            self.frames.pop().unwrap_or_default()
        } else {
            panic!("cannot pop the base scope frame");
        }
    }

    /// Set a variable in the innermost frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }

    /// Look a variable up from the innermost to the outermost frame.
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Bulk-write a mapping into the innermost frame.
    pub fn fill(&mut self, values: Frame) {
        if let Some(frame) = self.frames.last_mut() {
            frame.extend(values);
        }
    }

    /// Flatten all frames into one mapping, innermost bindings winning.
    pub fn env_snapshot(&self) -> Frame {
        let mut env = Frame::new();
        for frame in &self.frames {
            for (name, value) in frame {
                env.insert(name.clone(), value.clone());
            }
        }
        env
    }

    /// Number of frames, base included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
