use super::*;

qc!(lookup, _lookup);
fn _lookup((ops, addrs): (Vec<Operation<TestPrefix, i32>>, Vec<u32>)) -> bool {
    let trie = IpBinaryTrie::new();
    let mut model = Model::default();

    for op in ops {
        apply(&trie, op).unwrap();
        model.apply(op);
    }

    model
        .networks
        .keys()
        .map(|p| p.0)
        .chain(addrs)
        .all(|a| trie.lookup(&a.to_be_bytes()) == Ok(model.lookup(a)))
}

qc!(lookup_with_default, _lookup_with_default);
fn _lookup_with_default((ops, addrs): (Vec<Operation<TestPrefix, i32>>, Vec<u32>)) -> bool {
    let trie = IpBinaryTrie::with_default(i32::MIN);
    let mut model = Model::default();

    for op in ops {
        apply(&trie, op).unwrap();
        model.apply(op);
    }

    addrs.into_iter().all(|a| {
        trie.lookup_addr(std::net::Ipv4Addr::from(a)) == Some(model.lookup(a).unwrap_or(i32::MIN))
    })
}

qc!(node_count, _node_count);
fn _node_count(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let trie = IpBinaryTrie::new();
    let mut model = Model::default();

    for op in ops {
        apply(&trie, op).unwrap();
        model.apply(op);
        let nodes = trie.count_nodes();
        let non_leaf = trie.count_non_leaf_nodes();
        if nodes != (NodeCount { ipv4: model.nodes(), ipv6: 1 })
            || non_leaf.ipv4 != model.nodes() - model.networks.len()
        {
            return false;
        }
    }
    true
}

qc!(remove_all, _remove_all);
fn _remove_all(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let trie = IpBinaryTrie::new();
    let mut model = Model::default();

    for op in ops {
        apply(&trie, op).unwrap();
        model.apply(op);
    }

    let removed_all = model
        .networks
        .keys()
        .all(|p| trie.remove(&p.bytes(), p.1) == Ok(true));
    removed_all && trie.count_nodes() == (NodeCount { ipv4: 1, ipv6: 1 })
}

qc!(families_agree, _families_agree);
fn _families_agree((ops, addrs): (Vec<Operation<TestPrefix, i32>>, Vec<u32>)) -> bool {
    let trie = IpBinaryTrie::new();

    for op in ops {
        match op {
            Operation::Add(p, t) => {
                trie.add_or_update(&p.bytes(), p.1, t).unwrap();
                trie.add_or_update(&p.bytes_v6(), p.1, t).unwrap();
            }
            Operation::Remove(p) => {
                let v4 = trie.remove(&p.bytes(), p.1).unwrap();
                let v6 = trie.remove(&p.bytes_v6(), p.1).unwrap();
                if v4 != v6 {
                    return false;
                }
            }
        }
    }

    let count = trie.count_nodes();
    count.ipv4 == count.ipv6
        && addrs.into_iter().all(|a| {
            trie.lookup_addr(std::net::Ipv4Addr::from(a))
                == trie.lookup_addr(std::net::Ipv6Addr::from((a as u128) << 96))
        })
}

qc!(insert_network, _insert_network);
fn _insert_network(list: Vec<(TestPrefix, i32)>) -> bool {
    let a = IpBinaryTrie::new();
    let b = IpBinaryTrie::new();

    for (p, t) in list {
        a.add_or_update(&p.bytes(), p.1, t).unwrap();
        b.insert(&(p.0, p.1), t).unwrap();
    }

    format!("{a:?}") == format!("{b:?}")
}
