//! Adapters that turn addresses and networks into the byte representation used by the trie.
//!
//! The trie itself only understands addresses as bytes in network byte order, 4 bytes for IPv4
//! and 16 bytes for IPv6. [`Address`] and [`Network`] are implemented for the address types of
//! `std::net`, for the network types of `ipnet` (feature `ipnet`), `ipnetwork` (feature
//! `ipnetwork`) and `cidr` (feature `cidr`), and for tuples of an address and a prefix length.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{Error, Result};

/// The address family, which selects one of the two roots of the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// 32-bit addresses
    Ipv4,
    /// 128-bit addresses
    Ipv6,
}

impl Family {
    /// Number of bits in an address of this family.
    pub const fn bits(self) -> u8 {
        match self {
            Family::Ipv4 => 32,
            Family::Ipv6 => 128,
        }
    }

    /// Number of bytes in an address of this family.
    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Get the family from the length of an address in bytes.
    ///
    /// ```
    /// # use ip_binary_trie::*;
    /// assert_eq!(Family::from_len(4), Ok(Family::Ipv4));
    /// assert_eq!(Family::from_len(16), Ok(Family::Ipv6));
    /// assert_eq!(Family::from_len(6), Err(Error::InvalidAddressLength(6)));
    /// ```
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            4 => Ok(Family::Ipv4),
            16 => Ok(Family::Ipv6),
            len => Err(Error::InvalidAddressLength(len)),
        }
    }

    /// Check that `len` is a valid prefix length for this family.
    pub(crate) fn check_prefix_len(self, len: u8) -> Result<()> {
        if len > self.bits() {
            Err(Error::InvalidPrefixLength {
                len,
                max: self.bits(),
            })
        } else {
            Ok(())
        }
    }
}

/// Raw bytes of an address in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Octets {
    /// IPv4 address
    V4([u8; 4]),
    /// IPv6 address
    V6([u8; 16]),
}

impl Octets {
    /// The family of the address.
    pub fn family(&self) -> Family {
        match self {
            Octets::V4(_) => Family::Ipv4,
            Octets::V6(_) => Family::Ipv6,
        }
    }

    /// Number of bits of the address (32 or 128).
    pub fn bits(&self) -> u8 {
        self.family().bits()
    }

    /// The bytes as a slice.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Octets::V4(b) => b,
            Octets::V6(b) => b,
        }
    }
}

impl AsRef<[u8]> for Octets {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Octets> for IpAddr {
    fn from(octets: Octets) -> Self {
        match octets {
            Octets::V4(b) => IpAddr::V4(b.into()),
            Octets::V6(b) => IpAddr::V6(b.into()),
        }
    }
}

/// Trait for anything that can be looked up in the trie.
pub trait Address {
    /// The bytes of the address in network byte order.
    fn octets(&self) -> Octets;
}

/// Trait for anything that can be registered in the trie. Bits of [`Network::octets`] after the
/// first [`Network::prefix_len`] bits are ignored.
pub trait Network {
    /// The bytes of the base address in network byte order.
    fn octets(&self) -> Octets;

    /// Prefix length
    fn prefix_len(&self) -> u8;
}

impl<A: Address + ?Sized> Address for &A {
    fn octets(&self) -> Octets {
        (**self).octets()
    }
}

impl<N: Network + ?Sized> Network for &N {
    fn octets(&self) -> Octets {
        (**self).octets()
    }

    fn prefix_len(&self) -> u8 {
        (**self).prefix_len()
    }
}

impl Address for Ipv4Addr {
    fn octets(&self) -> Octets {
        Octets::V4(Ipv4Addr::octets(self))
    }
}

impl Address for Ipv6Addr {
    fn octets(&self) -> Octets {
        Octets::V6(Ipv6Addr::octets(self))
    }
}

impl Address for IpAddr {
    fn octets(&self) -> Octets {
        match self {
            IpAddr::V4(a) => Address::octets(a),
            IpAddr::V6(a) => Address::octets(a),
        }
    }
}

impl Address for [u8; 4] {
    fn octets(&self) -> Octets {
        Octets::V4(*self)
    }
}

impl Address for [u8; 16] {
    fn octets(&self) -> Octets {
        Octets::V6(*self)
    }
}

impl Address for Octets {
    fn octets(&self) -> Octets {
        *self
    }
}

impl<A: Address> Network for (A, u8) {
    fn octets(&self) -> Octets {
        self.0.octets()
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}

impl Network for (u32, u8) {
    fn octets(&self) -> Octets {
        Octets::V4(self.0.to_be_bytes())
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}

impl Network for (u128, u8) {
    fn octets(&self) -> Octets {
        Octets::V6(self.0.to_be_bytes())
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}

#[cfg(feature = "ipnet")]
impl Network for ipnet::Ipv4Net {
    fn octets(&self) -> Octets {
        Octets::V4(self.network().octets())
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }
}

#[cfg(feature = "ipnet")]
impl Network for ipnet::Ipv6Net {
    fn octets(&self) -> Octets {
        Octets::V6(self.network().octets())
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }
}

#[cfg(feature = "ipnet")]
impl Network for ipnet::IpNet {
    fn octets(&self) -> Octets {
        match self {
            ipnet::IpNet::V4(p) => Network::octets(p),
            ipnet::IpNet::V6(p) => Network::octets(p),
        }
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }
}

#[cfg(feature = "ipnetwork")]
impl Network for ipnetwork::Ipv4Network {
    fn octets(&self) -> Octets {
        Octets::V4(self.network().octets())
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "ipnetwork")]
impl Network for ipnetwork::Ipv6Network {
    fn octets(&self) -> Octets {
        Octets::V6(self.network().octets())
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "ipnetwork")]
impl Network for ipnetwork::IpNetwork {
    fn octets(&self) -> Octets {
        match self {
            ipnetwork::IpNetwork::V4(p) => Network::octets(p),
            ipnetwork::IpNetwork::V6(p) => Network::octets(p),
        }
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "cidr")]
impl Network for cidr::Ipv4Cidr {
    fn octets(&self) -> Octets {
        Octets::V4(self.first_address().octets())
    }

    fn prefix_len(&self) -> u8 {
        self.network_length()
    }
}

#[cfg(feature = "cidr")]
impl Network for cidr::Ipv6Cidr {
    fn octets(&self) -> Octets {
        Octets::V6(self.first_address().octets())
    }

    fn prefix_len(&self) -> u8 {
        self.network_length()
    }
}

#[cfg(feature = "cidr")]
impl Network for cidr::IpCidr {
    fn octets(&self) -> Octets {
        match self {
            cidr::IpCidr::V4(p) => Network::octets(p),
            cidr::IpCidr::V6(p) => Network::octets(p),
        }
    }

    fn prefix_len(&self) -> u8 {
        match self {
            cidr::IpCidr::V4(p) => p.network_length(),
            cidr::IpCidr::V6(p) => p.network_length(),
        }
    }
}
