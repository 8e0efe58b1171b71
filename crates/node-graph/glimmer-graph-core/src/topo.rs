use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use crate::types::NodeId;

/// Kahn ordering of `nodes` given `(from, to)` edges. Ready nodes are emitted in the order they
/// appear in `nodes`, which keeps evaluation deterministic. Returns `None` on a cycle.
pub fn topo_order(nodes: &[NodeId], edges: &[(NodeId, NodeId)]) -> Option<Vec<NodeId>> {
    let mut indeg: HashMap<NodeId, usize> = nodes.iter().map(|n| (*n, 0)).collect();
    let mut adj: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

    for (from, to) in edges {
        if from == to {
            return None;
        }
        adj.entry(*from).or_default().push(*to);
        *indeg.entry(*to).or_default() += 1;
    }

    let mut q: VecDeque<NodeId> = nodes
        .iter()
        .filter(|n| indeg.get(*n).copied() == Some(0))
        .copied()
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(u) = q.pop_front() {
        order.push(u);
        if let Some(vs) = adj.get(&u) {
            for v in vs {
                if let Some(d) = indeg.get_mut(v) {
                    *d -= 1;
                    if *d == 0 {
                        q.push_back(*v);
                    }
                }
            }
        }
    }

    (order.len() == indeg.len()).then_some(order)
}

/// Whether `target` can be reached from `start` by following `(from, to)` edges.
pub fn reaches(start: NodeId, target: NodeId, edges: &[(NodeId, NodeId)]) -> bool {
    if start == target {
        return true;
    }
    let mut adj: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for (from, to) in edges {
        adj.entry(*from).or_default().push(*to);
    }
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![start];
    while let Some(u) = stack.pop() {
        if !seen.insert(u) {
            continue;
        }
        for v in adj.get(&u).into_iter().flatten() {
            if *v == target {
                return true;
            }
            stack.push(*v);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_topo() {
        let (a, b, c) = (NodeId(1), NodeId(2), NodeId(3));
        let order = topo_order(&[c, b, a], &[(a, b), (b, c)]).unwrap();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn ties_follow_insertion_order() {
        let (a, b, c) = (NodeId(1), NodeId(2), NodeId(3));
        let order = topo_order(&[b, a, c], &[(a, c)]).unwrap();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn cycles_are_reported() {
        let (a, b) = (NodeId(1), NodeId(2));
        assert!(topo_order(&[a, b], &[(a, b), (b, a)]).is_none());
        assert!(reaches(b, a, &[(a, b), (b, a)]));
        assert!(!reaches(b, a, &[(a, b)]));
    }
}
