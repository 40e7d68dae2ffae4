//! Deterministic ordering and round-robin chunk assignment.

/// Orders `alive_dns` by simulated network proximity to `client_ip`.
///
/// Without a hint, ascending `dn_id` gives a stable, reproducible order.
/// With a hint, nodes whose host shares more of the client's first two
/// address octets sort first; ties (including all-zero scores) break by
/// ascending `dn_id`. A host that doesn't parse as `ip:port` scores 0.
pub fn sort_by_priority(
    alive_dns: &[String],
    host_of: impl Fn(&str) -> Option<String>,
    client_ip: Option<&str>,
) -> Vec<String> {
    let mut ordered: Vec<String> = alive_dns.to_vec();
    match client_ip {
        None => ordered.sort(),
        Some(client_ip) => {
            let client_prefix = first_two_octets(client_ip);
            ordered.sort_by(|a, b| {
                let score_a = proximity_score(&host_of(a), &client_prefix);
                let score_b = proximity_score(&host_of(b), &client_prefix);
                score_b.cmp(&score_a).then_with(|| a.cmp(b))
            });
        }
    }
    ordered
}

fn proximity_score(host: &Option<String>, client_prefix: &Option<[String; 2]>) -> usize {
    let (Some(host), Some(client_prefix)) = (host, client_prefix) else {
        return 0;
    };
    let Some(dn_prefix) = first_two_octets(&host_ip(host)) else {
        return 0;
    };
    client_prefix
        .iter()
        .zip(dn_prefix.iter())
        .filter(|(a, b)| a == b)
        .count()
}

/// Strips an optional `scheme://` and trailing `:port` from a host string.
fn host_ip(host: &str) -> String {
    host.rsplit("//")
        .next()
        .unwrap_or(host)
        .split(':')
        .next()
        .unwrap_or(host)
        .to_string()
}

fn first_two_octets(addr: &str) -> Option<[String; 2]> {
    let mut parts = addr.split('.');
    let a = parts.next()?.to_string();
    let b = parts.next()?.to_string();
    Some([a, b])
}

/// Round-robin chunk-to-replica assignment per §4.2: chunk `i` gets replica
/// slot `r` assigned to `prioritized[(i + r) % len]`. When `len < replica_factor`
/// the same node can appear more than once in a chunk's slot list; callers
/// treat the holder set as a set on insertion so duplicates collapse.
pub fn assign_chunks(prioritized: &[String], num_chunks: usize, replica_factor: usize) -> Vec<Vec<String>> {
    if prioritized.is_empty() {
        return vec![Vec::new(); num_chunks];
    }
    let len = prioritized.len();
    (0..num_chunks)
        .map(|i| {
            (0..replica_factor)
                .map(|r| prioritized[(i + r) % len].clone())
                .collect()
        })
        .collect()
}
