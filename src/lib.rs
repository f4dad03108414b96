//! This crate provides a binary trie for IP networks, where any lookup performs longest-prefix
//! match. It supports both IPv4 and IPv6, each stored in its own trie behind a single
//! [`IpBinaryTrie`]. The canonical interface works on addresses given as bytes in network byte
//! order (4 bytes for IPv4, 16 bytes for IPv6). Adapters for `std::net` addresses and for the
//! network types of [ipnet](https://docs.rs/ipnet), [ipnetwork](https://crates.io/crates/ipnetwork)
//! and [cidr](https://crates.io/crates/cidr) are provided in [`network`].
//!
//! # Description of the Tree
//!
//! Every node represents one bit position along the path of some address, starting at the most
//! significant bit of the first byte. A node has two optional children (for the next bit being 0
//! or 1) and an optional payload. A node with a payload is a *leaf*: the network whose prefix
//! length equals the depth of that node is registered. Lookups walk the address bit by bit and
//! remember the payload of the deepest leaf they pass. As deeper leaves correspond to longer
//! prefixes, this directly yields the longest-prefix match.
//!
//! The tree is not compressed: registering a network of prefix length `n` creates up to `n`
//! nodes. In turn, removing a network prunes every node that is neither a leaf nor needed to reach
//! a deeper leaf, so the tree always has exactly the nodes required by the registered networks.
//!
//! # Concurrency
//!
//! All operations take `&self`. Modifications are serialized by a lock, while lookups are never
//! blocked: they may run concurrently with a modification. Nodes are published only after they
//! are fully initialized, and nodes that are unlinked (or payloads that are replaced) are
//! reclaimed with [crossbeam-epoch](https://docs.rs/crossbeam-epoch) once no lookup can still
//! observe them. Lookups thus always see a valid trie, but may or may not observe a concurrent
//! modification (eventual consistency).
//!
//! # Operations on the tree
//!
//! The following are the computational complexities of the functions, where `w` is the number of
//! bits of the address (32 or 128), and `n` is the number of nodes in the tree.
//!
//! | Operation                                   | Complexity |
//! |---------------------------------------------|------------|
//! | `lookup`, `lookup_with`, `lookup_addr`      | `O(w)`     |
//! | `add_or_update`, `insert`                   | `O(w)`     |
//! | `remove`, `remove_network`                  | `O(w)`     |
//! | `count_nodes`, `count_non_leaf_nodes`       | `O(n)`     |
//!
//! ```
//! # use ip_binary_trie::*;
//! # use ipnet::IpNet;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let trie = IpBinaryTrie::new();
//! trie.insert(&"1.1.0.0/16".parse::<IpNet>()?, "1.1/16")?;
//! trie.insert(&"1.1.1.0/24".parse::<IpNet>()?, "1.1.1/24")?;
//! assert_eq!(trie.lookup_str("1.1.1.7")?, Some("1.1.1/24"));
//! assert_eq!(trie.lookup_str("1.1.2.0")?, Some("1.1/16"));
//!
//! trie.remove_network(&"1.1.1.0/24".parse::<IpNet>()?)?;
//! assert_eq!(trie.lookup_str("1.1.1.7")?, Some("1.1/16"));
//! assert_eq!(trie.count_nodes().ipv4, 17);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

mod fmt;
mod node;
mod trie;
#[cfg(test)]
mod fuzzing;

pub mod error;
pub mod network;

pub use error::Error;
pub use network::{Address, Family, Network, Octets};
pub use trie::{IpBinaryTrie, NodeCount};
