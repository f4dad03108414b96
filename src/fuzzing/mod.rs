//! Module for testing using fuzzing (quickcheck)

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use crate::*;
use quickcheck::Arbitrary;

mod basic;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P, T> {
    Add(P, T),
    Remove(P),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 2000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // all shrunken inputs pass, so `input` is minimal.
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}
pub(crate) use qc;

impl<P: Arbitrary, T: Arbitrary> Arbitrary for Operation<P, T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let p = P::arbitrary(g);
        if g.choose(&[
            true, true, true, true, true, true, true, false, false, false,
        ])
        .copied()
        .unwrap_or_default()
        {
            let t = T::arbitrary(g);
            Self::Add(p, t)
        } else {
            Self::Remove(p)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Add(p, t) => {
                let t = t.clone();
                Box::new(
                    p.clone()
                        .shrink()
                        .map(move |p| Operation::Add(p, t.clone())),
                )
            }
            Operation::Remove(p) => Box::new(p.clone().shrink().map(|p| Operation::Remove(p))),
        }
    }
}

/// An IPv4 network with all host bits cleared.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl TestPrefix {
    fn new(addr: u32, len: u8) -> Self {
        let mask = u32::MAX.checked_shl(32 - len as u32).unwrap_or(0);
        Self(addr & mask, len)
    }

    fn bytes(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// The same network, placed in the most significant bits of an IPv6 address.
    fn bytes_v6(&self) -> [u8; 16] {
        ((self.0 as u128) << 96).to_be_bytes()
    }

    /// All networks containing this one, including itself and `0.0.0.0/0`.
    fn ancestors(self) -> impl Iterator<Item = Self> {
        (0..=self.1).map(move |len| Self::new(self.0, len))
    }
}

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", std::net::Ipv4Addr::from(self.0), self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
                16, 24, 31, 32,
            ])
            .unwrap();
        Self::new(u32::arbitrary(g), len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            quickcheck::single_shrinker(Self::new(self.0, self.1 - 1))
        }
    }
}

/// Naive longest-prefix match table, used as the reference for the trie.
#[derive(Default)]
struct Model {
    networks: HashMap<TestPrefix, i32>,
}

impl Model {
    fn apply(&mut self, op: Operation<TestPrefix, i32>) {
        match op {
            Operation::Add(p, t) => {
                self.networks.insert(p, t);
            }
            Operation::Remove(p) => {
                self.networks.remove(&p);
            }
        }
    }

    fn lookup(&self, addr: u32) -> Option<i32> {
        (0..=32)
            .rev()
            .find_map(|len| self.networks.get(&TestPrefix::new(addr, len)))
            .copied()
    }

    fn nodes(&self) -> usize {
        self.networks
            .keys()
            .flat_map(|p| p.ancestors())
            .chain(std::iter::once(TestPrefix(0, 0)))
            .collect::<HashSet<_>>()
            .len()
    }
}

fn apply(trie: &IpBinaryTrie<i32>, op: Operation<TestPrefix, i32>) -> Result<(), Error> {
    match op {
        Operation::Add(p, t) => trie.add_or_update(&p.bytes(), p.1, t),
        Operation::Remove(p) => trie.remove(&p.bytes(), p.1).map(|_| ()),
    }
}
