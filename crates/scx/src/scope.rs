//! Dynamic scope stack.
//!
//! Frame 0 is the global frame and holds `define` bindings. Every lambda
//! call and every `let` block pushes one frame and pops it afterwards.
//! Lookup always walks the live stack from the innermost frame outwards, so
//! a lambda body sees its caller's bindings: scoping is dynamic, and lambdas
//! capture nothing.
//!
//! Binding names are arena strings owned by the binding, so the stack only
//! stores handles; comparing names needs the arena.

use crate::value::{Object, Value};
use scx_mem::{Arena, Handle};

/// One name/value binding. Both the name and the value are owned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    /// Arena string holding the name
    pub name: Handle,
    /// Bound value
    pub value: Value,
}

/// A level of the scope stack.
#[derive(Debug, Default)]
pub struct Frame {
    bindings: Vec<Binding>,
}

impl Frame {
    /// Bindings in creation order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub(crate) fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }

    fn position(&self, heap: &Arena<Object>, name: &str) -> Option<usize> {
        self.bindings.iter().position(|binding| {
            matches!(heap.get(binding.name), Some(Object::Str(text)) if text == name)
        })
    }
}

/// Location of a binding in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Frame index, 0 being global
    pub frame: usize,
    /// Index within the frame
    pub index: usize,
}

/// Stack of frames; never empty.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Creates a stack holding only the global frame.
    #[must_use]
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    /// Number of frames, global included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns a frame by index.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Pushes an empty frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
        scx_log::trace!("pushed frame {}", self.frames.len() - 1);
    }

    /// Pops the innermost frame. The global frame is never popped.
    ///
    /// The caller owns the returned bindings and must release them.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() == 1 {
            return None;
        }
        let frame = self.frames.pop();
        scx_log::trace!("popped frame {}", self.frames.len());
        frame
    }

    /// Finds `name`, innermost frame first.
    #[must_use]
    pub fn find(&self, heap: &Arena<Object>, name: &str) -> Option<Slot> {
        self.frames.iter().enumerate().rev().find_map(|(frame, bindings)| {
            bindings
                .position(heap, name)
                .map(|index| Slot { frame, index })
        })
    }

    /// Finds `name` in one frame only.
    #[must_use]
    pub fn find_in(&self, frame: usize, heap: &Arena<Object>, name: &str) -> Option<Slot> {
        self.frames
            .get(frame)?
            .position(heap, name)
            .map(|index| Slot { frame, index })
    }

    /// Returns the binding at `slot`.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&Binding> {
        self.frames.get(slot.frame)?.bindings.get(slot.index)
    }

    /// Replaces the value at `slot`, returning the previous one for the
    /// caller to release.
    pub fn replace(&mut self, slot: Slot, value: Value) -> Option<Value> {
        let binding = self.frames.get_mut(slot.frame)?.bindings.get_mut(slot.index)?;
        Some(std::mem::replace(&mut binding.value, value))
    }

    /// Appends a binding to frame `frame` (the innermost one if out of range).
    pub fn insert(&mut self, frame: usize, name: Handle, value: Value) {
        let last = self.frames.len() - 1;
        self.frames[frame.min(last)].bindings.push(Binding { name, value });
    }

    /// Index of the innermost frame.
    #[must_use]
    pub fn top(&self) -> usize {
        self.frames.len() - 1
    }

    /// Drops every frame and starts over with an empty global frame,
    /// returning all bindings for the caller to release.
    pub fn clear(&mut self) -> Vec<Binding> {
        let bindings = self.frames.drain(..).flat_map(Frame::into_bindings).collect();
        self.frames.push(Frame::default());
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(heap: &mut Arena<Object>, text: &str) -> Handle {
        heap.alloc(text.len() + 1, Object::Str(text.to_string()))
    }

    #[test]
    fn test_innermost_binding_wins() {
        let mut heap = Arena::bounded(1024);
        let mut scopes = ScopeStack::new();

        let outer = name(&mut heap, "x");
        scopes.insert(0, outer, Value::Int(1));
        scopes.push();
        let inner = name(&mut heap, "x");
        scopes.insert(scopes.top(), inner, Value::Int(2));

        let slot = scopes.find(&heap, "x").unwrap();
        assert_eq!(slot, Slot { frame: 1, index: 0 });
        assert_eq!(scopes.get(slot).unwrap().value, Value::Int(2));

        let popped = scopes.pop().unwrap();
        assert_eq!(popped.bindings().len(), 1);
        assert_eq!(scopes.get(scopes.find(&heap, "x").unwrap()).unwrap().value, Value::Int(1));
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.pop().is_none());
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_replace_returns_old_value() {
        let mut heap = Arena::bounded(1024);
        let mut scopes = ScopeStack::new();
        let y = name(&mut heap, "y");
        scopes.insert(0, y, Value::Int(1));

        let slot = scopes.find_in(0, &heap, "y").unwrap();
        assert_eq!(scopes.replace(slot, Value::Int(2)), Some(Value::Int(1)));
        assert_eq!(scopes.frame(0).unwrap().bindings().len(), 1);
        assert!(scopes.find_in(0, &heap, "z").is_none());
    }

    #[test]
    fn test_clear_returns_every_binding() {
        let mut heap = Arena::bounded(1024);
        let mut scopes = ScopeStack::new();
        let a = name(&mut heap, "a");
        let b = name(&mut heap, "b");
        scopes.insert(0, a, Value::Int(1));
        scopes.push();
        scopes.insert(1, b, Value::Int(2));

        assert_eq!(scopes.clear().len(), 2);
        assert_eq!(scopes.depth(), 1);
    }
}
