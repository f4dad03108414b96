//! Load routing table dumps into an [`IpBinaryTrie`] and print statistics about the resulting
//! tree: load time, number of nodes, node memory and the share of transit nodes.
//!
//! Every line of a dump holds a network and the address of its route, separated by whitespace:
//!
//! ```text
//! 1.0.4.0/24 195.66.225.86
//! 2600:2004::/32 2001:7f8:4::1a0b:1
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ip_binary_trie::*;
use ipnet::IpNet;
use log::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(about = "Print statistics of an IpBinaryTrie loaded from routing table dumps")]
struct Args {
    /// Dumps with one "network route" pair per line. IPv4 and IPv6 may be mixed.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Abort on the first malformed line instead of skipping it.
    #[arg(long)]
    strict: bool,
}

fn parse_line(line: &str) -> Result<(IpNet, IpAddr)> {
    let mut fields = line.split_whitespace();
    let network = fields.next().context("missing network")?;
    let route = fields.next().context("missing route")?;
    let network = network
        .parse::<IpNet>()
        .with_context(|| format!("invalid network {network:?}"))?;
    let route = route
        .parse::<IpAddr>()
        .with_context(|| format!("invalid route {route:?}"))?;
    Ok((network, route))
}

fn parse_file(path: &Path, strict: bool) -> Result<Vec<(IpNet, IpAddr)>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut routes = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("cannot read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line).with_context(|| format!("{}:{}", path.display(), i + 1)) {
            Ok(route) => routes.push(route),
            Err(e) if strict => return Err(e),
            Err(e) => warn!("skipping line: {e:#}"),
        }
    }
    debug!("parsed {} routes from {}", routes.len(), path.display());
    Ok(routes)
}

struct Load {
    networks: usize,
    millis: f64,
}

fn load(trie: &IpBinaryTrie<IpAddr>, routes: &[(IpNet, IpAddr)]) -> Result<Load> {
    let start = Instant::now();
    for (network, route) in routes {
        trie.insert(network, *route)?;
    }
    Ok(Load {
        networks: routes.len(),
        millis: start.elapsed().as_secs_f64() * 1000.0,
    })
}

fn report(family: &str, load: &Load, nodes: usize, non_leaf: usize) {
    let node_size = IpBinaryTrie::<IpAddr>::node_size();
    println!(
        "Load {family}: time(ms)={:.1}: networks={}: nodes={nodes}: nodes/ms={:.0}: nodes/network={:.2}",
        load.millis,
        load.networks,
        nodes as f64 / load.millis.max(f64::EPSILON),
        nodes as f64 / load.networks.max(1) as f64,
    );
    println!(
        "Consumed memory by nodes for {family} (MB): {:.2}",
        (nodes * node_size) as f64 / 1024.0 / 1024.0
    );
    println!(
        "Non-leaf {family} nodes: {non_leaf} ({:.1}%)",
        non_leaf as f64 * 100.0 / nodes as f64
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut routes = Vec::new();
    for path in &args.files {
        routes.extend(parse_file(path, args.strict)?);
    }
    let (ipv4, ipv6): (Vec<_>, Vec<_>) = routes
        .into_iter()
        .partition(|(network, _)| matches!(network, IpNet::V4(_)));
    info!("loading {} IPv4 and {} IPv6 networks", ipv4.len(), ipv6.len());

    let trie = IpBinaryTrie::new();
    let load_v4 = load(&trie, &ipv4)?;
    let load_v6 = load(&trie, &ipv6)?;
    let nodes = trie.count_nodes();
    let non_leaf = trie.count_non_leaf_nodes();

    println!("Node size: {}", IpBinaryTrie::<IpAddr>::node_size());
    report("IPv4", &load_v4, nodes.ipv4, non_leaf.ipv4);
    report("IPv6", &load_v6, nodes.ipv6, non_leaf.ipv6);
    Ok(())
}
