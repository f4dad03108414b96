use std::net::Ipv4Addr;

use ip_binary_trie::*;

use ipnet::Ipv4Net;
use rand::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let trie = IpBinaryTrie::<u32>::new();

    let mut rng = thread_rng();

    for _ in 0..1_000_000 {
        let prefix = Ipv4Net::new(Ipv4Addr::new(rng.gen(), 0, 0, 0), rng.gen_range(1..=8))?.trunc();

        if rng.gen_bool(0.7) {
            let value: u32 = rng.gen::<u8>() as u32;
            trie.insert(&prefix, value)?;
        } else if rng.gen_bool(0.5) {
            trie.remove_network(&prefix)?;
        } else {
            trie.lookup_addr(prefix.addr());
        }
    }

    println!("{:?}", trie.count_nodes());
    Ok(())
}
