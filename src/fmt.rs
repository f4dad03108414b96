//! Formatting implementation for the IpBinaryTrie

use std::fmt::{Debug, Display, Formatter, Result};
use std::net::{Ipv4Addr, Ipv6Addr};

use crossbeam_epoch::{self as epoch, Guard};

use crate::network::Family;
use crate::node::Node;
use crate::IpBinaryTrie;

/// Prints a network given as address bytes and prefix length in CIDR notation.
pub(crate) struct DisplayPrefix<'a>(pub(crate) &'a [u8], pub(crate) u8);

impl Display for DisplayPrefix<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if let Ok(b) = <[u8; 4]>::try_from(self.0) {
            write!(f, "{}/{}", Ipv4Addr::from(b), self.1)
        } else if let Ok(b) = <[u8; 16]>::try_from(self.0) {
            write!(f, "{}/{}", Ipv6Addr::from(b), self.1)
        } else {
            write!(f, "{:?}/{}", self.0, self.1)
        }
    }
}

impl Debug for DisplayPrefix<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Display::fmt(self, f)
    }
}

impl<T: Debug> Debug for IpBinaryTrie<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let guard = &epoch::pin();
        f.debug_struct("IpBinaryTrie")
            .field("default", &self.default)
            .field("ipv4", &DebugRoot(&self.ipv4, Family::Ipv4, guard))
            .field("ipv6", &DebugRoot(&self.ipv6, Family::Ipv6, guard))
            .finish()
    }
}

/// All registered networks below a root, as a map from network to payload.
struct DebugRoot<'a, T>(&'a Node<T>, Family, &'a Guard);

impl<T: Debug> Debug for DebugRoot<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let DebugRoot(root, family, guard) = *self;
        let mut leaves = Vec::new();
        collect_leaves(root, &mut [0; 16], 0, guard, &mut leaves);
        f.debug_map()
            .entries(leaves.iter().map(|(bytes, len, payload)| {
                (DisplayPrefix(&bytes[..family.bytes()], *len), payload)
            }))
            .finish()
    }
}

/// Depth-first walk collecting every leaf, in lexicographic order of the networks.
fn collect_leaves<'g, T>(
    node: &'g Node<T>,
    path: &mut [u8; 16],
    depth: usize,
    guard: &'g Guard,
    leaves: &mut Vec<([u8; 16], u8, &'g T)>,
) {
    if let Some(payload) = node.payload(guard) {
        leaves.push((*path, depth as u8, payload));
    }
    for bit in [false, true] {
        if let Some(child) = node.child(bit, guard) {
            let mask = 0x80 >> (depth % 8);
            if bit {
                path[depth / 8] |= mask;
            }
            collect_leaves(child, path, depth + 1, guard, leaves);
            path[depth / 8] &= !mask;
        }
    }
}
