//! Implementation of the dual-root binary trie.

use crossbeam_epoch::{self as epoch, Guard};
use log::trace;
use parking_lot::Mutex;

use crate::error::Result;
use crate::fmt::DisplayPrefix;
use crate::network::{Address, Family, Network};
use crate::node::{bit_at, Node};

mod remove;

/// Longest-prefix-match table over IPv4 and IPv6 networks, implemented as two uncompressed binary
/// tries (one per address family).
///
/// Lookups never block: they may run concurrently with each other and with a writer. Writes
/// ([`IpBinaryTrie::add_or_update`] and [`IpBinaryTrie::remove`]) are serialized by a single lock
/// shared by both address families. A lookup that overlaps with a write may or may not observe
/// that write, but it always observes a valid trie. The table is therefore eventually consistent,
/// not linearizable.
///
/// ```
/// # use ip_binary_trie::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let trie = IpBinaryTrie::with_default("default");
/// trie.add_or_update(&[10, 0, 0, 0], 8, "10/8")?;
/// trie.add_or_update(&[10, 1, 0, 0], 16, "10.1/16")?;
/// assert_eq!(trie.lookup(&[10, 1, 2, 3])?, Some("10.1/16"));
/// assert_eq!(trie.lookup(&[10, 2, 2, 3])?, Some("10/8"));
/// assert_eq!(trie.lookup(&[11, 0, 0, 0])?, Some("default"));
/// # Ok(())
/// # }
/// ```
pub struct IpBinaryTrie<T> {
    pub(crate) ipv4: Node<T>,
    pub(crate) ipv6: Node<T>,
    /// Returned by lookups that match no registered network.
    pub(crate) default: Option<T>,
    write_lock: Mutex<()>,
}

/// Number of nodes in each of the two roots of an [`IpBinaryTrie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeCount {
    /// Nodes reachable from the IPv4 root, including the root itself.
    pub ipv4: usize,
    /// Nodes reachable from the IPv6 root, including the root itself.
    pub ipv6: usize,
}

impl NodeCount {
    /// Nodes of both address families.
    pub fn total(&self) -> usize {
        self.ipv4 + self.ipv6
    }
}

impl<T> Default for IpBinaryTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IpBinaryTrie<T> {
    /// Create an empty trie, whose lookups return `None` if no network matches.
    pub fn new() -> Self {
        Self {
            ipv4: Node::default(),
            ipv6: Node::default(),
            default: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Create an empty trie, whose lookups return `default` if no network matches.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// let trie: IpBinaryTrie<u32> = IpBinaryTrie::with_default(0);
    /// assert_eq!(trie.lookup(&[1, 2, 3, 4]), Ok(Some(0)));
    /// ```
    pub fn with_default(default: T) -> Self {
        Self {
            default: Some(default),
            ..Self::new()
        }
    }

    /// The payload returned by lookups that match no registered network.
    pub fn default_payload(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// Size of a single node in bytes. Each node also owns a separate allocation for its payload
    /// if it is a leaf.
    pub fn node_size() -> usize {
        std::mem::size_of::<Node<T>>()
    }

    /// Call `f` with the payload of the longest registered network containing `addr`, or the
    /// default payload if no registered network contains it. `addr` must be an IPv4 (4 bytes) or
    /// IPv6 (16 bytes) address in network byte order.
    ///
    /// The payload is only borrowed for the duration of `f`, which makes this the lookup of choice
    /// for payloads that are expensive to clone.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.add_or_update(&[192, 168, 0, 0], 16, String::from("private"))?;
    /// assert_eq!(trie.lookup_with(&[192, 168, 1, 1], |p| p.map(|s| s.len()))?, Some(7));
    /// assert_eq!(trie.lookup_with(&[192, 169, 1, 1], |p| p.map(|s| s.len()))?, None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup_with<R, F>(&self, addr: &[u8], f: F) -> Result<R>
    where
        F: FnOnce(Option<&T>) -> R,
    {
        let family = Family::from_len(addr.len())?;
        let guard = &epoch::pin();
        Ok(f(self.lpm(family, addr, guard)))
    }

    /// Get the payload of the longest registered network containing `addr`, or the default
    /// payload if no registered network contains it. `addr` must be an IPv4 (4 bytes) or IPv6 (16
    /// bytes) address in network byte order.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.add_or_update(&[0, 0, 0, 0], 1, 'A')?;
    /// trie.add_or_update(&[128, 0, 0, 0], 1, 'B')?;
    /// assert_eq!(trie.lookup(&[127, 255, 255, 255])?, Some('A'));
    /// assert_eq!(trie.lookup(&[128, 0, 0, 0])?, Some('B'));
    /// assert_eq!(trie.lookup(&[0; 16])?, None);
    /// assert_eq!(trie.lookup(&[1, 2, 3]), Err(Error::InvalidAddressLength(3)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup(&self, addr: &[u8]) -> Result<Option<T>>
    where
        T: Clone,
    {
        self.lookup_with(addr, |payload| payload.cloned())
    }

    /// Same as [`Self::lookup`], but for an already parsed address, which cannot fail.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # use std::net::Ipv6Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.insert(&("2600:2004::".parse::<Ipv6Addr>()?, 32), 1)?;
    /// assert_eq!(trie.lookup_addr("2600:2004:4::1a0b:1".parse::<Ipv6Addr>()?), Some(1));
    /// assert_eq!(trie.lookup_addr([1, 1, 1, 1]), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup_addr<A: Address>(&self, addr: A) -> Option<T>
    where
        T: Clone,
    {
        let octets = addr.octets();
        let guard = &epoch::pin();
        self.lpm(octets.family(), octets.as_slice(), guard).cloned()
    }

    /// Same as [`Self::lookup`], but for an address in dotted-quad (IPv4) or colon-hexadecimal
    /// (IPv6) notation.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.add_or_update(&[1, 0, 0, 0], 24, 'X')?;
    /// assert_eq!(trie.lookup_str("1.0.0.255")?, Some('X'));
    /// assert_eq!(trie.lookup_str("1.0.1.0")?, None);
    /// assert!(matches!(trie.lookup_str("1.0.1"), Err(Error::InvalidAddress(_))));
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup_str(&self, addr: &str) -> Result<Option<T>>
    where
        T: Clone,
    {
        let addr: std::net::IpAddr = addr.parse()?;
        Ok(self.lookup_addr(addr))
    }

    /// Count the nodes of both tries, including the two roots. This walks the entire trie.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// assert_eq!(trie.count_nodes(), NodeCount { ipv4: 1, ipv6: 1 });
    /// trie.add_or_update(&[1, 0, 0, 0], 24, ())?;
    /// assert_eq!(trie.count_nodes(), NodeCount { ipv4: 25, ipv6: 1 });
    /// # Ok(())
    /// # }
    /// ```
    pub fn count_nodes(&self) -> NodeCount {
        let guard = &epoch::pin();
        NodeCount {
            ipv4: self.ipv4.count(guard),
            ipv6: self.ipv6.count(guard),
        }
    }

    /// Count the nodes of both tries that are not a leaf, i.e., that only exist because a longer
    /// network is registered (or the empty roots).
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.add_or_update(&[1, 0, 0, 0], 24, ())?;
    /// trie.add_or_update(&[1, 0, 0, 0], 16, ())?;
    /// assert_eq!(trie.count_non_leaf_nodes(), NodeCount { ipv4: 23, ipv6: 1 });
    /// # Ok(())
    /// # }
    /// ```
    pub fn count_non_leaf_nodes(&self) -> NodeCount {
        let guard = &epoch::pin();
        NodeCount {
            ipv4: self.ipv4.count_non_leaf(guard),
            ipv6: self.ipv6.count_non_leaf(guard),
        }
    }
}

impl<T: Send + 'static> IpBinaryTrie<T> {
    /// Register `payload` for the network given by the first `prefix_len` bits of `prefix`, or
    /// replace the payload if that network is already registered. `prefix` must be an IPv4 (4
    /// bytes) or IPv6 (16 bytes) address in network byte order. A `prefix_len` of 0 registers the
    /// default route of that address family.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.add_or_update(&[28, 0, 18, 0], 24, 1)?;
    /// trie.add_or_update(&[28, 0, 18, 0], 24, 2)?;
    /// assert_eq!(trie.lookup(&[28, 0, 18, 7])?, Some(2));
    /// assert_eq!(
    ///     trie.add_or_update(&[28, 0, 18, 0], 33, 3),
    ///     Err(Error::InvalidPrefixLength { len: 33, max: 32 })
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_or_update(&self, prefix: &[u8], prefix_len: u8, payload: T) -> Result<()> {
        let family = Family::from_len(prefix.len())?;
        family.check_prefix_len(prefix_len)?;

        let _lock = self.write_lock.lock();
        let guard = &epoch::pin();
        let mut node = self.root(family);
        for i in 0..prefix_len as usize {
            // Safety: we hold the write lock.
            node = unsafe { node.child_or_insert(bit_at(prefix, i), guard) };
        }
        // Safety: we hold the write lock.
        unsafe { node.set_payload(payload, guard) };
        trace!("registered {}", DisplayPrefix(prefix, prefix_len));
        Ok(())
    }

    /// Register `payload` for `network`. See [`Self::add_or_update`].
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # use ipnet::IpNet;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.insert(&"2600:2004::/32".parse::<IpNet>()?, 'Y')?;
    /// assert_eq!(trie.lookup_str("2600:2004:ffff:ffff:ffff:ffff:ffff:ffff")?, Some('Y'));
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert<N: Network + ?Sized>(&self, network: &N, payload: T) -> Result<()> {
        let octets = network.octets();
        self.add_or_update(octets.as_slice(), network.prefix_len(), payload)
    }
}

/// Private function implementations
impl<T> IpBinaryTrie<T> {
    #[inline(always)]
    pub(crate) fn root(&self, family: Family) -> &Node<T> {
        match family {
            Family::Ipv4 => &self.ipv4,
            Family::Ipv6 => &self.ipv6,
        }
    }

    /// Walk from the root along `addr`, remembering the payload of the deepest leaf.
    fn lpm<'a>(&'a self, family: Family, addr: &[u8], guard: &'a Guard) -> Option<&'a T> {
        debug_assert_eq!(addr.len(), family.bytes());
        let mut node = self.root(family);
        let mut best = node.payload(guard);
        for i in 0..addr.len() * 8 {
            match node.child(bit_at(addr, i), guard) {
                Some(child) => {
                    node = child;
                    best = node.payload(guard).or(best);
                }
                None => break,
            }
        }
        best.or(self.default.as_ref())
    }
}
