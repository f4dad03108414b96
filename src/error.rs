//! Errors reported at the boundary of the trie.

use std::net::AddrParseError;

use thiserror::Error;

/// Result type of all fallible trie operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid input passed to the trie. All variants are detected before the trie is touched, so a
/// failed call never leaves a partially applied mutation behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The address is neither 4 (IPv4) nor 16 (IPv6) bytes long.
    #[error("IPv4 or IPv6 is expected, got an address of {0} bytes")]
    InvalidAddressLength(usize),

    /// The prefix length is longer than the address it applies to.
    #[error("Prefix length {len} exceeds the {max} bits of the address")]
    InvalidPrefixLength {
        /// The requested prefix length
        len: u8,
        /// Number of bits in the address family
        max: u8,
    },

    /// The textual address could not be parsed.
    #[error("Invalid IP address: {0}")]
    InvalidAddress(#[from] AddrParseError),
}
