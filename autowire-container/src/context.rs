//! Resolution context: the identifiers in progress on the current call chain.
//!
//! The context is a linked list of stack frames. Entering a resolution pushes
//! a [`Frame`] that lives on the caller's stack and points at its parent, so
//! leaving the call (by success, error or unwinding) pops it with no cleanup
//! code. Nothing is shared between concurrent resolutions.
//!
//! A factory holding the container may start a fresh top-level `get` from
//! inside a resolution. The explicit chain does not reach that call, so each
//! frame is also published in a per-thread [`ActiveChain`] until it is
//! popped.
//!
//! ```
//! use autowire_container::context::ResolutionContext;
//! use autowire_container::key::DependencyKey;
//!
//! let root = ResolutionContext::root();
//! let car = root.enter(DependencyKey::new("Car"));
//! let ctx = car.context();
//! assert!(ctx.contains(&DependencyKey::new("Car")));
//! assert!(!root.contains(&DependencyKey::new("Car")));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::iter;

use crate::key::DependencyKey;

/// Immutable view of the in-progress chain.
#[derive(Clone, Copy, Default)]
pub struct ResolutionContext<'a> {
    top: Option<&'a Frame<'a>>,
}

/// One in-progress identifier.
pub struct Frame<'a> {
    key: DependencyKey,
    parent: ResolutionContext<'a>,
    depth: usize,
}

impl<'a> ResolutionContext<'a> {
    /// An empty context, used by every top-level call.
    pub fn root() -> Self {
        Self { top: None }
    }

    /// Creates the frame marking `key` in progress on top of this context.
    pub fn enter(self, key: DependencyKey) -> Frame<'a> {
        Frame {
            key,
            parent: self,
            depth: self.depth() + 1,
        }
    }

    pub fn depth(&self) -> usize {
        self.top.map_or(0, |frame| frame.depth)
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.keys().any(|k| k == key)
    }

    /// In-progress identifiers, innermost first.
    pub fn keys(&self) -> impl Iterator<Item = &'a DependencyKey> + use<'a> {
        iter::successors(self.top, |frame| frame.parent.top).map(|frame| &frame.key)
    }

    /// The chain from the outermost entry to `repeated`, for diagnostics.
    pub fn chain_to(&self, repeated: &DependencyKey) -> Vec<DependencyKey> {
        let mut chain: Vec<DependencyKey> = self.keys().cloned().collect();
        chain.reverse();
        chain.push(repeated.clone());
        chain
    }
}

impl Frame<'_> {
    /// The context with this frame on top.
    pub fn context(&self) -> ResolutionContext<'_> {
        ResolutionContext { top: Some(self) }
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }
}

// ═══════════════════════════════════════════
// Per-thread chain
// ═══════════════════════════════════════════

thread_local! {
    /// `(owner, key)` pairs in progress on this thread, outermost first.
    static ACTIVE: RefCell<Vec<(usize, DependencyKey)>> = const { RefCell::new(Vec::new()) };
}

/// The identifiers one owner (a container) has in progress on this thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveChain {
    owner: usize,
}

/// Keeps one identifier in the [`ActiveChain`] until dropped.
#[must_use]
pub(crate) struct ActiveGuard(());

impl ActiveChain {
    pub fn new(owner: usize) -> Self {
        Self { owner }
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        ACTIVE.with(|active| {
            active
                .borrow()
                .iter()
                .any(|(owner, k)| *owner == self.owner && k == key)
        })
    }

    /// The chain from the outermost entry to `repeated`, for diagnostics.
    pub fn chain_to(&self, repeated: &DependencyKey) -> Vec<DependencyKey> {
        ACTIVE.with(|active| {
            active
                .borrow()
                .iter()
                .filter(|(owner, _)| *owner == self.owner)
                .map(|(_, key)| key.clone())
                .chain(iter::once(repeated.clone()))
                .collect()
        })
    }

    /// Marks `key` in progress. Guards must be dropped in reverse order.
    pub fn enter(&self, key: &DependencyKey) -> ActiveGuard {
        ACTIVE.with(|active| active.borrow_mut().push((self.owner, key.clone())));
        ActiveGuard(())
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

impl fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.reverse();
        f.debug_list().entries(keys).finish()
    }
}
