//! Code to remove networks from the trie.

use crossbeam_epoch as epoch;
use log::{debug, trace};

use super::*;

impl<T: Send + 'static> IpBinaryTrie<T> {
    /// Remove the network given by the first `prefix_len` bits of `prefix`, and prune all nodes
    /// that are no longer needed by any other registered network. Returns `true` if the network
    /// was registered. Removing a network that is not registered does nothing.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// trie.add_or_update(&[0, 0, 0, 0], 1, 'A')?;
    /// trie.add_or_update(&[0, 0, 0, 0], 2, 'C')?;
    /// assert_eq!(trie.count_nodes().ipv4, 3);
    ///
    /// // 0.0.0.0/1 is a transit node of 0.0.0.0/2, so it is kept.
    /// assert_eq!(trie.remove(&[0, 0, 0, 0], 1), Ok(true));
    /// assert_eq!(trie.remove(&[0, 0, 0, 0], 1), Ok(false));
    /// assert_eq!(trie.lookup(&[0, 0, 0, 0])?, Some('C'));
    /// assert_eq!(trie.count_nodes().ipv4, 3);
    ///
    /// assert_eq!(trie.remove(&[0, 0, 0, 0], 2), Ok(true));
    /// assert_eq!(trie.count_nodes().ipv4, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&self, prefix: &[u8], prefix_len: u8) -> Result<bool> {
        let family = Family::from_len(prefix.len())?;
        family.check_prefix_len(prefix_len)?;

        let _lock = self.write_lock.lock();
        let guard = &epoch::pin();

        // all ancestors of the node to remove, together with the direction taken at each of them.
        let mut path: Vec<(&Node<T>, bool)> = Vec::with_capacity(prefix_len as usize);
        let mut node = self.root(family);
        for i in 0..prefix_len as usize {
            let bit = bit_at(prefix, i);
            match node.child(bit, guard) {
                Some(child) => {
                    path.push((node, bit));
                    node = child;
                }
                None => {
                    debug!(
                        "cannot remove {}: not registered",
                        DisplayPrefix(prefix, prefix_len)
                    );
                    return Ok(false);
                }
            }
        }

        // Safety: we hold the write lock.
        let removed = unsafe { node.clear_payload(guard) };

        // walk back up, and unlink every node that is neither a leaf nor a transit node.
        let mut pruned = 0;
        while let Some((parent, bit)) = path.pop() {
            if node.is_leaf(guard) || node.has_children(guard) {
                break;
            }
            // Safety: we hold the write lock, and `node` is neither a leaf nor has any children.
            unsafe { parent.prune_child(bit, guard) };
            pruned += 1;
            node = parent;
        }

        trace!(
            "removed {} ({pruned} nodes pruned)",
            DisplayPrefix(prefix, prefix_len)
        );
        Ok(removed)
    }

    /// Remove `network`. See [`Self::remove`].
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// # use ipnet::IpNet;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie = IpBinaryTrie::new();
    /// let net: IpNet = "2607:f750:5000::/40".parse()?;
    /// trie.insert(&net, 1)?;
    /// assert_eq!(trie.remove_network(&"2a00:86c0:1009::/48".parse::<IpNet>()?), Ok(false));
    /// assert_eq!(trie.count_nodes().ipv6, 41);
    /// assert_eq!(trie.remove_network(&net), Ok(true));
    /// assert_eq!(trie.count_nodes().ipv6, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove_network<N: Network + ?Sized>(&self, network: &N) -> Result<bool> {
        let octets = network.octets();
        self.remove(octets.as_slice(), network.prefix_len())
    }
}
