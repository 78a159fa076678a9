//! Traversal cursor with a typed, per-frame message store.
//!
//! A [`Cursor`] records the lineage of the node currently being visited: one
//! frame per tree level, from a root sentinel down to the current node. Each
//! frame owns a small message store. Messages are never inherited; a visit
//! that wants to talk to an ancestor addresses the ancestor's frame
//! explicitly via a [`FrameRef`].
//!
//! # Deferred edits
//!
//! A deeply nested visit cannot safely insert siblings into an enclosing
//! block while that block's children are still being visited. Instead it
//! stashes the pending edit on the block's frame:
//!
//! ```
//! use rewrite_core::{Cursor, MessageKey};
//!
//! struct PendingLines;
//! impl MessageKey for PendingLines {
//!     type Value = Vec<String>;
//! }
//!
//! let mut cursor: Cursor<&str> = Cursor::new();
//! cursor.push("block");
//! cursor.push("statement");
//! cursor.push("expression");
//!
//! let block = cursor.ancestor_frame(|v| *v == "block").unwrap();
//! cursor.accumulate::<PendingLines>(block).push("inserted".to_string());
//!
//! cursor.pop();
//! cursor.pop();
//! // Back at the block: drain exactly once.
//! assert_eq!(cursor.take_message::<PendingLines>(), Some(vec!["inserted".to_string()]));
//! assert_eq!(cursor.take_message::<PendingLines>(), None);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use thiserror::Error;

/// A typed message key.
///
/// Keys are zero-sized marker types; the associated `Value` fixes the type
/// stored under the key, so readers never downcast by hand.
pub trait MessageKey: 'static {
    type Value: 'static;
}

/// Errors from cursor navigation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CursorError {
    /// Asked for an ancestor deeper than the current lineage.
    #[error("cursor is too shallow: requested ancestor {requested} but depth is {depth}")]
    TooShallow { requested: usize, depth: usize },
}

/// Handle to a live frame of a [`Cursor`].
///
/// A `FrameRef` stays valid while its frame is on the stack, which for an
/// ancestor is the whole visit of its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRef(usize);

#[derive(Default)]
struct MessageStore {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl MessageStore {
    fn put<K: MessageKey>(&mut self, value: K::Value) {
        self.entries.insert(TypeId::of::<K>(), Box::new(value));
    }

    fn take<K: MessageKey>(&mut self) -> Option<K::Value> {
        let boxed = self.entries.remove(&TypeId::of::<K>())?;
        boxed.downcast::<K::Value>().ok().map(|b| *b)
    }

    fn get<K: MessageKey>(&self) -> Option<&K::Value> {
        self.entries
            .get(&TypeId::of::<K>())
            .and_then(|b| b.downcast_ref::<K::Value>())
    }

    fn get_or_insert_with<K: MessageKey>(
        &mut self,
        factory: impl FnOnce() -> K::Value,
    ) -> &mut K::Value {
        let slot = self
            .entries
            .entry(TypeId::of::<K>())
            .or_insert_with(|| Box::new(factory()));
        match slot.downcast_mut::<K::Value>() {
            Some(value) => value,
            None => unreachable!("message store entries are keyed by their value type"),
        }
    }
}

struct Frame<T> {
    /// `None` only for the root sentinel.
    value: Option<T>,
    messages: MessageStore,
}

/// Lineage of the node being visited, plus per-frame messages.
pub struct Cursor<T> {
    frames: Vec<Frame<T>>,
}

impl<T> Default for Cursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cursor<T> {
    /// A cursor holding only the root sentinel.
    pub fn new() -> Self {
        Cursor {
            frames: vec![Frame {
                value: None,
                messages: MessageStore::default(),
            }],
        }
    }

    /// Descend into `value`.
    pub fn push(&mut self, value: T) {
        self.frames.push(Frame {
            value: Some(value),
            messages: MessageStore::default(),
        });
    }

    /// Return to the parent, discarding the current frame and its messages.
    ///
    /// The root sentinel is never popped.
    pub fn pop(&mut self) -> Option<T> {
        if self.frames.len() <= 1 {
            return None;
        }
        self.frames.pop().and_then(|f| f.value)
    }

    /// Number of node frames above the root sentinel.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn is_root(&self) -> bool {
        self.frames.len() == 1
    }

    /// The current frame.
    pub fn current(&self) -> FrameRef {
        FrameRef(self.frames.len() - 1)
    }

    /// The root sentinel frame.
    pub fn root(&self) -> FrameRef {
        FrameRef(0)
    }

    /// The node at the current frame.
    pub fn value(&self) -> Option<&T> {
        self.frames.last().and_then(|f| f.value.as_ref())
    }

    /// Replace the node held by the current frame, returning the old one.
    ///
    /// Messages on the frame are kept.
    pub fn replace_value(&mut self, value: T) -> Option<T> {
        if self.frames.len() <= 1 {
            return None;
        }
        self.frames
            .last_mut()
            .and_then(|f| f.value.replace(value))
    }

    /// The node held by the parent frame.
    pub fn parent_value(&self) -> Option<&T> {
        let len = self.frames.len();
        if len < 2 {
            return None;
        }
        self.frames[len - 2].value.as_ref()
    }

    /// The node held by `frame`.
    pub fn value_at(&self, frame: FrameRef) -> Option<&T> {
        self.frames.get(frame.0).and_then(|f| f.value.as_ref())
    }

    /// The frame directly above `frame`.
    pub fn parent_frame(&self, frame: FrameRef) -> Option<FrameRef> {
        if frame.0 == 0 || frame.0 >= self.frames.len() {
            None
        } else {
            Some(FrameRef(frame.0 - 1))
        }
    }

    /// The nearest frame strictly above the current one whose node
    /// satisfies `pred`.
    pub fn ancestor_frame(&self, mut pred: impl FnMut(&T) -> bool) -> Option<FrameRef> {
        let len = self.frames.len();
        (0..len.saturating_sub(1))
            .rev()
            .find(|&i| self.frames[i].value.as_ref().is_some_and(&mut pred))
            .map(FrameRef)
    }

    /// The nearest ancestor node (excluding the current node) satisfying
    /// `pred`.
    pub fn nearest_ancestor(&self, pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.ancestor_frame(pred).and_then(|f| self.value_at(f))
    }

    /// Like [`Cursor::nearest_ancestor`], for lookups an invariant guarantees.
    ///
    /// # Panics
    ///
    /// Panics when no ancestor matches: the caller's assumption about the
    /// tree shape is wrong.
    pub fn nearest_ancestor_or_fail(&self, pred: impl FnMut(&T) -> bool, what: &str) -> &T {
        match self.nearest_ancestor(pred) {
            Some(v) => v,
            None => panic!(
                "expected an enclosing {} at cursor depth {}, found none",
                what,
                self.depth()
            ),
        }
    }

    /// The nearest node satisfying `pred`, starting with the current node.
    pub fn first_enclosing(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.path().find(|v| pred(v))
    }

    /// The frame holding the nearest node satisfying `pred`, starting with
    /// the current frame.
    pub fn enclosing_frame(&self, mut pred: impl FnMut(&T) -> bool) -> Option<FrameRef> {
        (0..self.frames.len())
            .rev()
            .find(|&i| self.frames[i].value.as_ref().is_some_and(&mut pred))
            .map(FrameRef)
    }

    /// The `n`-th ancestor frame: `0` is the current frame, `1` its parent.
    pub fn nth_ancestor_frame(&self, n: usize) -> Result<FrameRef, CursorError> {
        let depth = self.depth();
        if n > depth {
            return Err(CursorError::TooShallow {
                requested: n,
                depth,
            });
        }
        Ok(FrameRef(self.frames.len() - 1 - n))
    }

    /// Nodes from the current one up to the outermost.
    pub fn path(&self) -> impl Iterator<Item = &T> {
        self.frames.iter().rev().filter_map(|f| f.value.as_ref())
    }

    /// Frames (with their nodes) from the current one up to the outermost.
    pub fn frames(&self) -> impl Iterator<Item = (FrameRef, &T)> {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(i, f)| f.value.as_ref().map(|v| (FrameRef(i), v)))
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Attach a message to the current frame, replacing any previous value.
    pub fn put_message<K: MessageKey>(&mut self, value: K::Value) {
        let at = self.current();
        self.put_message_at::<K>(at, value);
    }

    /// Attach a message to `frame`.
    pub fn put_message_at<K: MessageKey>(&mut self, frame: FrameRef, value: K::Value) {
        self.frame_mut(frame).messages.put::<K>(value);
    }

    /// Remove and return the current frame's message.
    pub fn take_message<K: MessageKey>(&mut self) -> Option<K::Value> {
        let at = self.current();
        self.take_message_at::<K>(at)
    }

    /// Remove and return the message stored on `frame`.
    pub fn take_message_at<K: MessageKey>(&mut self, frame: FrameRef) -> Option<K::Value> {
        self.frames
            .get_mut(frame.0)
            .and_then(|f| f.messages.take::<K>())
    }

    /// Borrow the message stored on `frame` without consuming it.
    pub fn peek_message_at<K: MessageKey>(&self, frame: FrameRef) -> Option<&K::Value> {
        self.frames.get(frame.0).and_then(|f| f.messages.get::<K>())
    }

    /// Mutable accumulator stored on `frame`, created empty on first use.
    pub fn accumulate<K>(&mut self, frame: FrameRef) -> &mut K::Value
    where
        K: MessageKey,
        K::Value: Default,
    {
        self.accumulate_with::<K>(frame, Default::default)
    }

    /// Mutable accumulator stored on `frame`, created by `factory` on first
    /// use.
    pub fn accumulate_with<K: MessageKey>(
        &mut self,
        frame: FrameRef,
        factory: impl FnOnce() -> K::Value,
    ) -> &mut K::Value {
        self.frame_mut(frame).messages.get_or_insert_with::<K>(factory)
    }

    fn frame_mut(&mut self, frame: FrameRef) -> &mut Frame<T> {
        let depth = self.depth();
        match self.frames.get_mut(frame.0) {
            Some(f) => f,
            None => panic!(
                "stale cursor frame reference {:?} (depth is {})",
                frame, depth
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note;
    impl MessageKey for Note {
        type Value = &'static str;
    }

    struct Count;
    impl MessageKey for Count {
        type Value = usize;
    }

    fn cursor_of(path: &[&'static str]) -> Cursor<&'static str> {
        let mut c = Cursor::new();
        for p in path {
            c.push(*p);
        }
        c
    }

    mod navigation {
        use super::*;

        #[test]
        fn root_is_never_popped() {
            let mut c: Cursor<u32> = Cursor::new();
            assert!(c.is_root());
            assert_eq!(c.pop(), None);
            c.push(1);
            assert_eq!(c.depth(), 1);
            assert_eq!(c.pop(), Some(1));
            assert_eq!(c.pop(), None);
            assert_eq!(c.depth(), 0);
        }

        #[test]
        fn value_and_parent() {
            let c = cursor_of(&["unit", "class", "method"]);
            assert_eq!(c.value(), Some(&"method"));
            assert_eq!(c.parent_value(), Some(&"class"));
        }

        #[test]
        fn replace_value_keeps_messages() {
            let mut c = cursor_of(&["unit", "old"]);
            c.put_message::<Note>("kept");
            assert_eq!(c.replace_value("new"), Some("old"));
            assert_eq!(c.value(), Some(&"new"));
            assert_eq!(c.take_message::<Note>(), Some("kept"));
        }

        #[test]
        fn nearest_ancestor_excludes_current() {
            let c = cursor_of(&["block", "stmt", "block"]);
            let f = c.ancestor_frame(|v| *v == "block").unwrap();
            assert_eq!(f, FrameRef(1));
            assert_eq!(c.nearest_ancestor(|v| *v == "missing"), None);
            assert_eq!(c.first_enclosing(|v| *v == "block"), Some(&"block"));
            assert_eq!(c.enclosing_frame(|v| *v == "block"), Some(FrameRef(3)));
        }

        #[test]
        #[should_panic(expected = "expected an enclosing statement")]
        fn nearest_ancestor_or_fail_panics() {
            let c = cursor_of(&["unit", "expr"]);
            c.nearest_ancestor_or_fail(|v| *v == "stmt", "statement");
        }

        #[test]
        fn nth_ancestor_frame() {
            let c = cursor_of(&["a", "b", "c"]);
            assert_eq!(c.value_at(c.nth_ancestor_frame(0).unwrap()), Some(&"c"));
            assert_eq!(c.value_at(c.nth_ancestor_frame(2).unwrap()), Some(&"a"));
            assert_eq!(c.value_at(c.nth_ancestor_frame(3).unwrap()), None);
            assert_eq!(
                c.nth_ancestor_frame(4),
                Err(CursorError::TooShallow {
                    requested: 4,
                    depth: 3
                })
            );
        }

        #[test]
        fn path_walks_upward() {
            let c = cursor_of(&["a", "b", "c"]);
            let path: Vec<_> = c.path().copied().collect();
            assert_eq!(path, vec!["c", "b", "a"]);
        }

        #[test]
        fn frames_skip_the_root() {
            let mut c = cursor_of(&["a", "b"]);
            let frames: Vec<_> = c.frames().map(|(f, v)| (f, *v)).collect();
            assert_eq!(frames, vec![(FrameRef(2), "b"), (FrameRef(1), "a")]);
            let root = c.root();
            c.put_message_at::<Note>(root, "unit-wide");
            assert_eq!(c.value_at(root), None);
            assert_eq!(c.peek_message_at::<Note>(root), Some(&"unit-wide"));
        }
    }

    mod messages {
        use super::*;

        #[test]
        fn take_is_single_consumption() {
            let mut c = cursor_of(&["a"]);
            c.put_message::<Note>("hello");
            assert_eq!(c.peek_message_at::<Note>(c.current()), Some(&"hello"));
            assert_eq!(c.take_message::<Note>(), Some("hello"));
            assert_eq!(c.take_message::<Note>(), None);
        }

        #[test]
        fn messages_are_not_inherited() {
            let mut c = cursor_of(&["a"]);
            c.put_message::<Note>("parent");
            c.push("b");
            assert_eq!(c.take_message::<Note>(), None);
            let parent = c.parent_frame(c.current()).unwrap();
            assert_eq!(c.take_message_at::<Note>(parent), Some("parent"));
        }

        #[test]
        fn messages_are_discarded_on_pop() {
            let mut c = cursor_of(&["a"]);
            c.push("b");
            c.put_message::<Note>("child");
            c.pop();
            c.push("b2");
            assert_eq!(c.take_message::<Note>(), None);
        }

        #[test]
        fn keys_do_not_collide() {
            let mut c = cursor_of(&["a"]);
            c.put_message::<Note>("n");
            c.put_message::<Count>(3);
            assert_eq!(c.take_message::<Count>(), Some(3));
            assert_eq!(c.take_message::<Note>(), Some("n"));
        }

        #[test]
        fn accumulate_from_siblings() {
            struct Edits;
            impl MessageKey for Edits {
                type Value = Vec<u32>;
            }

            let mut c = cursor_of(&["block"]);
            let block = c.current();
            for i in 0..3 {
                c.push("stmt");
                c.accumulate::<Edits>(block).push(i);
                c.pop();
            }
            assert_eq!(c.take_message::<Edits>(), Some(vec![0, 1, 2]));
        }

        #[test]
        fn accumulate_with_factory_runs_once() {
            let mut c = cursor_of(&["a"]);
            let at = c.current();
            *c.accumulate_with::<Count>(at, || 10) += 1;
            *c.accumulate_with::<Count>(at, || 100) += 1;
            assert_eq!(c.take_message::<Count>(), Some(12));
        }
    }
}
