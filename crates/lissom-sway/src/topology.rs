//! Update-order planning for simulated joints.

use crate::config::Seed;
use lissom_rig::{JointId, JointSource};
use std::collections::{BTreeSet, HashMap};

/// Precomputed traversal data for one configuration.
#[derive(Debug, Clone, Default)]
pub(crate) struct Plan {
    /// Seed indices in simulation order: shallower joints first, declaration
    /// order preserved within a depth.
    pub order: Vec<usize>,
    /// Per seed: seeds whose nearest simulated ancestor is this one.
    pub children: Vec<Vec<usize>>,
    /// Per seed: true when no ancestor joint is itself simulated.
    pub roots: Vec<bool>,
}

/// Builds the simulation order and parent/child linkage for a seed set.
pub(crate) fn plan<S: JointSource>(source: &S, seeds: &[Seed]) -> Plan {
    let depths: Vec<usize> = seeds.iter().map(|s| depth(source, s.joint)).collect();
    let mut order: Vec<usize> = (0..seeds.len()).collect();
    order.sort_by_key(|&i| depths[i]);

    let by_joint: HashMap<JointId, usize> = seeds
        .iter()
        .enumerate()
        .map(|(i, s)| (s.joint, i))
        .collect();

    let mut children = vec![Vec::new(); seeds.len()];
    let mut roots = vec![true; seeds.len()];
    for (i, seed) in seeds.iter().enumerate() {
        let mut current = Some(seed.parent);
        while let Some(id) = current {
            if let Some(&owner) = by_joint.get(&id) {
                children[owner].push(i);
                roots[i] = false;
                break;
            }
            current = source.parent(id);
        }
    }

    Plan {
        order,
        children,
        roots,
    }
}

/// Collects the ancestor closure of `ids`, deduplicated and ordered so every
/// joint appears after all of its ancestors.
pub(crate) fn refresh_list<S: JointSource>(
    source: &S,
    ids: impl Iterator<Item = JointId>,
) -> Vec<JointId> {
    // Arena IDs ascend parents-first, so sorted order is refresh order.
    let mut set = BTreeSet::new();
    for id in ids {
        let mut current = Some(id);
        while let Some(joint) = current {
            if !set.insert(joint) {
                break;
            }
            current = source.parent(joint);
        }
    }
    set.into_iter().collect()
}

fn depth<S: JointSource>(source: &S, id: JointId) -> usize {
    let mut depth = 0;
    let mut current = source.parent(id);
    while let Some(id) = current {
        depth += 1;
        current = source.parent(id);
    }
    depth
}
