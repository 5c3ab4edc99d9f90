//! Reusable parse scratch state and the pool that recycles it
//!
//! The pool is an allocation optimization, not a concurrency limit:
//! [`ContextPool::acquire`] always succeeds, allocating when the free list is
//! empty, and [`ContextPool::release`] drops contexts beyond the configured
//! capacity.

use crate::detail::DetailNode;
use crate::event::Event;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Text buffers larger than this are not carried back into the pool
const MAX_RETAINED_TEXT: usize = 64 * 1024;

/// Where the state machine is relative to the message structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// No `<event>` start tag seen yet
    Outside,
    /// Inside `<event>`, no detail subtree open
    InEvent,
    /// Inside the top-level `<detail>` subtree
    InDetail,
    /// `</event>` seen; the rest of the document is ignored
    Finished,
}

/// Scratch state for one parse call
#[derive(Debug)]
pub struct ParseContext {
    pub(crate) state: ParseState,
    /// Open detail nodes, innermost last
    pub(crate) stack: Vec<DetailNode>,
    /// Set once the top-level `<detail>` has been closed
    pub(crate) detail_closed: bool,
    /// Open elements inside `<event>` that are being skipped
    pub(crate) ignored: usize,
    /// Most recent text token since the last tag
    pub(crate) text: String,
    pub(crate) event: Event,
}

impl ParseContext {
    pub fn new() -> Self {
        Self {
            state: ParseState::Outside,
            stack: Vec::new(),
            detail_closed: false,
            ignored: 0,
            text: String::new(),
            event: Event::blank(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Depth of the open detail subtree
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Hand the populated event to the caller, leaving a blank one behind
    pub(crate) fn take_event(&mut self) -> Event {
        std::mem::replace(&mut self.event, Event::blank())
    }

    /// Return to a clean slate
    pub fn reset(&mut self) {
        self.state = ParseState::Outside;
        self.stack.clear();
        self.detail_closed = false;
        self.ignored = 0;
        if self.text.capacity() > MAX_RETAINED_TEXT {
            self.text = String::new();
        } else {
            self.text.clear();
        }
        self.event = Event::blank();
    }

    pub fn is_clean(&self) -> bool {
        self.state == ParseState::Outside
            && self.stack.is_empty()
            && !self.detail_closed
            && self.ignored == 0
            && self.text.is_empty()
            && self.event == Event::blank()
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded free list of parse contexts
#[derive(Debug)]
pub struct ContextPool {
    free: Mutex<Vec<ParseContext>>,
    capacity: usize,
}

impl ContextPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Maximum number of contexts held for reuse
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of contexts currently waiting for reuse
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Take a context from the free list, or allocate one
    pub fn acquire(&self) -> ParseContext {
        self.free.lock().pop().unwrap_or_default()
    }

    /// Clean a context and keep it for reuse if there is room
    pub fn release(&self, mut context: ParseContext) {
        context.reset();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(context);
        }
    }

    /// Acquire a context that returns itself to the pool when dropped
    pub fn lease(&self) -> PooledContext<'_> {
        PooledContext {
            pool: self,
            context: Some(self.acquire()),
        }
    }
}

/// A context on loan from a [`ContextPool`]
pub struct PooledContext<'a> {
    pool: &'a ContextPool,
    context: Option<ParseContext>,
}

impl Deref for PooledContext<'_> {
    type Target = ParseContext;

    fn deref(&self) -> &ParseContext {
        // Only `drop` takes the context out.
        self.context.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut ParseContext {
        self.context.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            self.pool.release(context);
        }
    }
}
