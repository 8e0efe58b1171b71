//! Type inference for inferring pins.
//!
//! Inferring pins are partitioned into groups: pins a node declares as sharing a type, and
//! pairs of inferring pins connected to each other. Each group takes the concrete type of the
//! first (in connection order) declared-type pin connected to any of its members, or
//! [`PinType::Any`] when none is.

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::script::NodeSlot;
use crate::types::{NodeId, PinRef, PinType};

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // keep the earliest pin as the representative
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Desired type for every inferring pin in the script.
pub(crate) fn infer_types(
    nodes: &IndexMap<NodeId, NodeSlot>,
    connections: &IndexMap<PinRef, PinRef>,
) -> Vec<(PinRef, PinType)> {
    let mut index: HashMap<PinRef, usize> = HashMap::new();
    let mut refs: Vec<PinRef> = Vec::new();
    for slot in nodes.values() {
        for pin in slot.pins().iter().filter(|p| p.is_inferred()) {
            let r = PinRef::new(slot.id(), pin.id);
            index.insert(r, refs.len());
            refs.push(r);
        }
    }

    let mut uf = UnionFind::new(refs.len());
    for slot in nodes.values() {
        for group in slot.node().type_groups() {
            let members: Vec<usize> = group
                .iter()
                .filter_map(|p| index.get(&PinRef::new(slot.id(), *p)).copied())
                .collect();
            for pair in members.windows(2) {
                uf.union(pair[0], pair[1]);
            }
        }
    }
    for (to, from) in connections {
        if let (Some(&a), Some(&b)) = (index.get(to), index.get(from)) {
            uf.union(a, b);
        }
    }

    let mut informed: HashMap<usize, PinType> = HashMap::new();
    for (to, from) in connections {
        let (member, informer) = match (index.get(to), index.get(from)) {
            (Some(&i), None) => (i, *from),
            (None, Some(&i)) => (i, *to),
            _ => continue,
        };
        let ty = nodes
            .get(&informer.node)
            .and_then(|slot| slot.pins().ty(informer.pin));
        if let Some(ty) = ty.filter(|t| t.is_concrete()) {
            let root = uf.find(member);
            informed.entry(root).or_insert_with(|| ty.clone());
        }
    }

    (0..refs.len())
        .map(|i| {
            let root = uf.find(i);
            let ty = informed.get(&root).cloned().unwrap_or(PinType::Any);
            (refs[i], ty)
        })
        .collect()
}
