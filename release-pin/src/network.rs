//! Network grouping of version tags
//!
//! Release tags such as `mainnet-v1.58.3` carry their deployment network as
//! the prefix before the first `-`. Tags without a `-` fall into the default
//! bucket.

use std::collections::BTreeMap;

/// Bucket for tags that carry no network prefix.
pub const DEFAULT_NETWORK: &str = "default";

/// Extract the network label of a version tag.
pub fn network_of(tag: &str) -> &str {
    match tag.split_once('-') {
        Some((network, _)) => network,
        None => DEFAULT_NETWORK,
    }
}

/// Partition tags by network, preserving the input order within each group.
pub fn group_by_network<'a, I>(tags: I) -> BTreeMap<&'a str, Vec<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for tag in tags {
        groups.entry(network_of(tag)).or_default().push(tag);
    }
    groups
}
