//! Multi-valued adjacency graphs used for inclusion clusters.

use std::hash::Hash;

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

/// Directed adjacency multimap.
///
/// Each key maps to an ordered set of values: insertion order is kept and an
/// edge is never stored twice.
#[derive(Clone, Debug)]
pub struct Graph<K> {
    edges: FxHashMap<K, IndexSet<K>>,
}

impl<K> Default for Graph<K> {
    fn default() -> Self {
        Self {
            edges: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> Graph<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the edge `key → value`. Returns false if it was already there.
    pub fn put(&mut self, key: K, value: K) -> bool {
        self.edges.entry(key).or_default().insert(value)
    }

    /// Values recorded for `key`, in insertion order. Empty for unknown keys.
    pub fn get(&self, key: K) -> impl Iterator<Item = K> + '_ {
        self.edges.get(&key).into_iter().flatten().copied()
    }

    pub fn has_values(&self, key: K) -> bool {
        self.edges.get(&key).is_some_and(|values| !values.is_empty())
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.edges.contains_key(&key)
    }

    /// Number of keys with at least one recorded edge.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// A forward and a backward [`Graph`] kept in sync.
///
/// Used as "document A includes document B": forward edges point at what a
/// document includes, backward edges at what includes it.
#[derive(Clone, Debug)]
pub struct BidirectionalGraph<K> {
    forward: Graph<K>,
    backward: Graph<K>,
    roots: FxHashMap<K, IndexSet<K>>,
}

impl<K> Default for BidirectionalGraph<K> {
    fn default() -> Self {
        Self {
            forward: Graph::default(),
            backward: Graph::default(),
            roots: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> BidirectionalGraph<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `from → to` in both directions. Returns false if already known.
    ///
    /// A new edge drops every cached root set.
    pub fn put(&mut self, from: K, to: K) -> bool {
        let added = self.forward.put(from, to);
        self.backward.put(to, from);
        if added {
            self.roots.clear();
        }
        added
    }

    /// Nodes `key` points to.
    pub fn get_to(&self, key: K) -> impl Iterator<Item = K> + '_ {
        self.forward.get(key)
    }

    /// Nodes pointing to `key`.
    pub fn get_from(&self, key: K) -> impl Iterator<Item = K> + '_ {
        self.backward.get(key)
    }

    /// Whether `key` takes part in any edge.
    pub fn contains(&self, key: K) -> bool {
        self.forward.contains_key(key) || self.backward.contains_key(key)
    }

    pub fn forward(&self) -> &Graph<K> {
        &self.forward
    }

    /// Roots reachable from `start` by following backward edges.
    ///
    /// A root is a node nothing points to. A cyclic cluster has no such node,
    /// so when a backward edge lands on the path currently being walked,
    /// every node of the closed cycle counts as a root. Callers filtering
    /// roots (by namespace, say) can then still pick any cycle member. A node
    /// with no incoming edges is its own root.
    ///
    /// Results are cached per start node until an edge is added; pass
    /// `recalc` to recompute anyway.
    pub fn roots(&mut self, start: K, recalc: bool) -> IndexSet<K> {
        if !recalc {
            if let Some(cached) = self.roots.get(&start) {
                return cached.clone();
            }
        }

        let mut roots = IndexSet::new();
        let mut path = IndexSet::new();
        let mut visited = FxHashSet::default();
        visited.insert(start);
        self.collect_roots(start, &mut path, &mut visited, &mut roots);

        self.roots.insert(start, roots.clone());
        roots
    }

    fn collect_roots(
        &self,
        node: K,
        path: &mut IndexSet<K>,
        visited: &mut FxHashSet<K>,
        roots: &mut IndexSet<K>,
    ) {
        if !self.backward.has_values(node) {
            roots.insert(node);
            return;
        }

        path.insert(node);
        for parent in self.backward.get(node) {
            if let Some(entry) = path.get_index_of(&parent) {
                // the walk came back around: the whole cycle is rooted
                roots.extend(path.iter().skip(entry).copied());
            } else if visited.insert(parent) {
                self.collect_roots(parent, path, visited, roots);
            }
        }
        path.pop();
    }

    /// Every node reachable from `root` through forward edges, `root` included.
    pub fn reachable_from(&self, root: K) -> IndexSet<K> {
        let mut reached = IndexSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if reached.insert(node) {
                stack.extend(self.forward.get(node).filter(|next| !reached.contains(next)));
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(u32, u32)]) -> BidirectionalGraph<u32> {
        let mut graph = BidirectionalGraph::new();
        for &(from, to) in edges {
            graph.put(from, to);
        }
        graph
    }

    #[test]
    fn test_graph_put_is_idempotent() {
        let mut g = Graph::new();
        assert!(g.put(1, 2));
        assert!(g.put(1, 3));
        assert!(!g.put(1, 2));

        assert_eq!(g.get(1).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(g.get(9).count(), 0);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_bidirectional_sync() {
        let g = graph(&[(1, 2), (3, 2), (1, 2)]);

        assert_eq!(g.get_to(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(g.get_from(2).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(g.get_from(1).count(), 0);
        assert!(g.contains(3));
        assert!(!g.contains(4));
    }

    #[test]
    fn test_roots_of_chain() {
        let mut g = graph(&[(1, 2), (2, 3)]);
        assert_eq!(g.roots(3, false).into_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(g.roots(1, false).into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_roots_of_diamond() {
        let mut g = graph(&[(1, 3), (2, 3), (3, 4)]);
        let mut roots: Vec<_> = g.roots(4, false).into_iter().collect();
        roots.sort();
        assert_eq!(roots, vec![1, 2]);
    }

    #[test]
    fn test_roots_of_unknown_node_is_itself() {
        let mut g = graph(&[(1, 2)]);
        assert_eq!(g.roots(7, false).into_iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_roots_terminate_on_cycle() {
        // 1 → 2 → 3 → 1, nothing outside
        let mut g = graph(&[(1, 2), (2, 3), (3, 1)]);
        let mut roots: Vec<_> = g.roots(1, false).into_iter().collect();
        roots.sort();
        assert_eq!(roots, vec![1, 2, 3]);
    }

    #[test]
    fn test_roots_of_cycle_above_start() {
        // 1 ⇄ 2 → 3: both cycle members root 3, not just the one closing it
        let mut g = graph(&[(1, 2), (2, 1), (2, 3)]);
        let mut roots: Vec<_> = g.roots(3, false).into_iter().collect();
        roots.sort();
        assert_eq!(roots, vec![1, 2]);
        assert!(!g.roots(3, true).contains(&3));
    }

    #[test]
    fn test_roots_of_cycle_with_entry() {
        // 0 → 1 ⇄ 2
        let mut g = graph(&[(0, 1), (1, 2), (2, 1)]);
        let roots = g.roots(2, false);
        assert!(roots.contains(&0));
        assert!(roots.contains(&2));
    }

    #[test]
    fn test_roots_cache_invalidated_by_new_edge() {
        let mut g = graph(&[(1, 2)]);
        assert_eq!(g.roots(2, false).into_iter().collect::<Vec<_>>(), vec![1]);

        g.put(0, 1);
        assert_eq!(g.roots(2, false).into_iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(g.roots(2, true).into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_reachable_from() {
        let g = graph(&[(1, 2), (2, 3), (3, 1), (4, 1)]);
        let mut reached: Vec<_> = g.reachable_from(1).into_iter().collect();
        reached.sort();
        assert_eq!(reached, vec![1, 2, 3]);
        assert_eq!(g.reachable_from(9).into_iter().collect::<Vec<_>>(), vec![9]);
    }
}
