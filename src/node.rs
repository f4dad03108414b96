//! The unit of trie structure.
//!
//! Child slots and the payload slot are atomic pointers, such that a lookup can walk the trie
//! while a writer is modifying it. Writers must hold the lock of the trie; readers only pin the
//! current epoch. Anything a writer unlinks is handed to [`Guard::defer_destroy`], and therefore
//! stays valid for every reader that could still hold a reference to it.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};

/// One bit position along the path of some address.
pub(crate) struct Node<T> {
    /// Child for the next bit being 0.
    pub(crate) branch0: Atomic<Node<T>>,
    /// Child for the next bit being 1.
    pub(crate) branch1: Atomic<Node<T>>,
    /// The payload of a registered network ending at this depth. A node is a leaf exactly if this
    /// is non-null.
    pub(crate) payload: Atomic<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            branch0: Atomic::null(),
            branch1: Atomic::null(),
            payload: Atomic::null(),
        }
    }
}

impl<T> Node<T> {
    /// Get the child slot for the given bit.
    #[inline(always)]
    pub(crate) fn branch(&self, bit: bool) -> &Atomic<Node<T>> {
        if bit {
            &self.branch1
        } else {
            &self.branch0
        }
    }

    /// Get the child for the given bit, if there is one.
    #[inline(always)]
    pub(crate) fn child<'g>(&self, bit: bool, guard: &'g Guard) -> Option<&'g Node<T>> {
        // Safety: nodes are only destroyed through `defer_destroy` after being unlinked, and the
        // guard keeps the current epoch pinned.
        unsafe { self.branch(bit).load(Ordering::Acquire, guard).as_ref() }
    }

    /// Get the payload of the node, or `None` if the node is not a leaf.
    #[inline(always)]
    pub(crate) fn payload<'g>(&self, guard: &'g Guard) -> Option<&'g T> {
        // Safety: see `child`.
        unsafe { self.payload.load(Ordering::Acquire, guard).as_ref() }
    }

    #[inline(always)]
    pub(crate) fn is_leaf(&self, guard: &Guard) -> bool {
        !self.payload.load(Ordering::Acquire, guard).is_null()
    }

    #[inline(always)]
    pub(crate) fn has_children(&self, guard: &Guard) -> bool {
        !self.branch0.load(Ordering::Acquire, guard).is_null()
            || !self.branch1.load(Ordering::Acquire, guard).is_null()
    }

    /// Get the child for the given bit, creating and linking an empty node if it is missing.
    ///
    /// *Safety*: the caller must hold the write lock of the trie.
    pub(crate) unsafe fn child_or_insert<'g>(&self, bit: bool, guard: &'g Guard) -> &'g Node<T> {
        let slot = self.branch(bit);
        let mut child = slot.load(Ordering::Acquire, guard);
        if child.is_null() {
            // the new node is fully initialized before it becomes reachable.
            child = Owned::new(Node::default()).into_shared(guard);
            slot.store(child, Ordering::Release);
        }
        unsafe { child.deref() }
    }

    /// Publish a new payload, turning the node into a leaf. Any previous payload is retired.
    ///
    /// *Safety*: the caller must hold the write lock of the trie.
    pub(crate) unsafe fn set_payload(&self, payload: T, guard: &Guard)
    where
        T: Send + 'static,
    {
        let old = self.payload.swap(Owned::new(payload), Ordering::AcqRel, guard);
        if !old.is_null() {
            unsafe { guard.defer_destroy(old) };
        }
    }

    /// Remove the payload, turning the node into a branch node. Returns `true` if the node was a
    /// leaf before.
    ///
    /// *Safety*: the caller must hold the write lock of the trie.
    pub(crate) unsafe fn clear_payload(&self, guard: &Guard) -> bool
    where
        T: Send + 'static,
    {
        let old = self.payload.swap(Shared::null(), Ordering::AcqRel, guard);
        if old.is_null() {
            false
        } else {
            unsafe { guard.defer_destroy(old) };
            true
        }
    }

    /// Unlink the child for the given bit and retire it.
    ///
    /// *Safety*: the caller must hold the write lock of the trie, and the child must neither be a
    /// leaf nor have any children.
    pub(crate) unsafe fn prune_child(&self, bit: bool, guard: &Guard)
    where
        T: Send + 'static,
    {
        let child = self.branch(bit).swap(Shared::null(), Ordering::AcqRel, guard);
        debug_assert!(!child.is_null());
        if !child.is_null() {
            unsafe { guard.defer_destroy(child) };
        }
    }

    /// Count all nodes in the subtree, including `self`.
    pub(crate) fn count(&self, guard: &Guard) -> usize {
        1 + [false, true]
            .into_iter()
            .filter_map(|bit| self.child(bit, guard))
            .map(|child| child.count(guard))
            .sum::<usize>()
    }

    /// Count all nodes in the subtree (including `self`) that are not a leaf.
    pub(crate) fn count_non_leaf(&self, guard: &Guard) -> usize {
        usize::from(!self.is_leaf(guard))
            + [false, true]
                .into_iter()
                .filter_map(|bit| self.child(bit, guard))
                .map(|child| child.count_non_leaf(guard))
                .sum::<usize>()
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // Safety: a node is only dropped once it is no longer reachable by any reader, either
        // because the whole trie is dropped, or because it was retired (and then it has neither
        // children nor a payload).
        unsafe {
            let guard = epoch::unprotected();
            for slot in [&self.branch0, &self.branch1] {
                let child = slot.load(Ordering::Relaxed, guard);
                if !child.is_null() {
                    drop(child.into_owned());
                }
            }
            let payload = self.payload.load(Ordering::Relaxed, guard);
            if !payload.is_null() {
                drop(payload.into_owned());
            }
        }
    }
}

/// Get the bit at position `i`, counted from the most significant bit of the first byte.
#[inline(always)]
pub(crate) fn bit_at(bytes: &[u8], i: usize) -> bool {
    debug_assert!(i < bytes.len() * 8);
    (bytes[i / 8] >> (7 - i % 8)) & 1 == 1
}
