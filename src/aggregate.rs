//! Partition a pile of bonds into connected components, one bond list per
//! molecule-to-be.

use crate::arena::AtomId;
use crate::core::{Bond, BondKey, BondOrder};
use crate::error::{Error, Result};
use ahash::{HashMap, HashMapExt};
use petgraph::unionfind::UnionFind;
use std::collections::hash_map::Entry;
use tracing::{debug, instrument, trace};

/// Group `bonds` into connected components.
///
/// Exact duplicates (same unordered pair, same order) collapse to their first
/// occurrence; the same pair with a different order is an error. The output
/// is deterministic: groups appear in order of their first bond, bonds within
/// a group keep input order, and every bond lands in exactly one group.
/// Atoms that appear in no bond are not represented at all.
#[instrument(level = "debug", skip_all, fields(bonds = bonds.len()))]
pub fn aggregate(bonds: &[Bond]) -> Result<Vec<Vec<Bond>>> {
    if bonds.is_empty() {
        return Ok(Vec::new());
    }

    let mut orders: HashMap<BondKey, BondOrder> = HashMap::with_capacity(bonds.len());
    let mut deduped = Vec::with_capacity(bonds.len());
    for bond in bonds {
        let (a, b) = bond.atoms();
        match orders.entry(bond.key()) {
            Entry::Occupied(entry) => {
                let first = *entry.get();
                if first != bond.order() {
                    return Err(Error::ConflictingOrder {
                        a,
                        b,
                        first,
                        second: bond.order(),
                    });
                }
                trace!(%a, %b, "dropping duplicate bond");
            }
            Entry::Vacant(entry) => {
                entry.insert(bond.order());
                deduped.push(*bond);
            }
        }
    }

    // compact per-atom indices for the union-find
    let mut compact: HashMap<AtomId, usize> = HashMap::with_capacity(deduped.len() + 1);
    for bond in &deduped {
        let (a, b) = bond.atoms();
        for id in [a, b] {
            let next = compact.len();
            compact.entry(id).or_insert(next);
        }
    }

    let mut sets = UnionFind::<usize>::new(compact.len());
    for bond in &deduped {
        let (a, b) = bond.atoms();
        sets.union(compact[&a], compact[&b]);
    }

    let mut groups: Vec<Vec<Bond>> = Vec::new();
    let mut slots: HashMap<usize, usize> = HashMap::new();
    for bond in deduped {
        let root = sets.find(compact[&bond.atoms().0]);
        let slot = *slots.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(bond);
    }
    debug!(groups = groups.len(), "aggregated bonds");
    Ok(groups)
}
