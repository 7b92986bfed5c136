//! Append-only rooted tree with lowest-common-ancestor queries.
//!
//! Each node stores its depth and a binary-lifting table: entry `i` is the ancestor
//! `2^i` levels above the node. Tables are filled once, when the node is appended, from
//! the already complete tables of its ancestors. An LCA query lifts the deeper node to
//! the depth of the other one and then climbs both in power-of-two steps, giving
//! `O(log depth)` per query.
//!
//! Tree nodes are numbered `0, 1, 2, ...` in insertion order; node `0` is the root.

/// A rooted tree built top-down, answering ancestor queries in logarithmic time.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::graph::LcaTree;
///
/// //      0
/// //     / \
/// //    1   2
/// //   / \
/// //  3   4
/// let mut tree = LcaTree::new(5);
/// let a = tree.add_node(0);
/// let b = tree.add_node(0);
/// let c = tree.add_node(a);
/// let d = tree.add_node(a);
///
/// assert_eq!(tree.lca(c, d), a);
/// assert_eq!(tree.lca(c, b), 0);
/// assert_eq!(tree.depth(d), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LcaTree {
    depth: Vec<usize>,
    /// `path[n][i]` is the ancestor of `n` at distance `2^i`
    path: Vec<Vec<usize>>,
}

impl LcaTree {
    /// Creates a tree containing only the root, with room for `capacity` nodes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut depth = Vec::with_capacity(capacity.max(1));
        let mut path = Vec::with_capacity(capacity.max(1));
        depth.push(0);
        path.push(Vec::new());
        LcaTree { depth, path }
    }

    /// Appends a child of `parent` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a node of the tree.
    pub fn add_node(&mut self, parent: usize) -> usize {
        let id = self.path.len();
        let depth = self.depth[parent] + 1;

        let mut path = vec![parent];
        let mut i = 0;
        while let Some(&next) = self.path[path[i]].get(i) {
            path.push(next);
            i += 1;
        }

        self.depth.push(depth);
        self.path.push(path);
        id
    }

    /// Returns the number of nodes in the tree, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Always `false`: the root exists from construction on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns the parent of `node`, or `None` for the root.
    #[must_use]
    pub fn parent_of(&self, node: usize) -> Option<usize> {
        self.path[node].first().copied()
    }

    /// Returns the distance of `node` from the root.
    #[must_use]
    pub fn depth(&self, node: usize) -> usize {
        self.depth[node]
    }

    /// Checks whether `ancestor` lies on the path from `node` to the root.
    ///
    /// Every node is its own ancestor.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        self.depth[ancestor] <= self.depth[node]
            && self.lift(node, self.depth[ancestor]) == ancestor
    }

    /// Returns the lowest common ancestor of `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either node is not part of the tree.
    #[must_use]
    pub fn lca(&self, a: usize, b: usize) -> usize {
        let (mut a, mut b) = if self.depth[a] >= self.depth[b] {
            (a, b)
        } else {
            (b, a)
        };
        a = self.lift(a, self.depth[b]);
        if a == b {
            return a;
        }

        // Both nodes sit at the same depth, so their tables have the same length
        let mut level = self.path[a].len();
        while level > 0 {
            level -= 1;
            if level >= self.path[a].len() {
                continue;
            }
            let (next_a, next_b) = (self.path[a][level], self.path[b][level]);
            if next_a != next_b {
                a = next_a;
                b = next_b;
            }
        }
        self.path[a][0]
    }

    /// Walks `node` up to the given depth, using the largest jumps first.
    fn lift(&self, mut node: usize, target_depth: usize) -> usize {
        let mut diff = self.depth[node] - target_depth;
        while diff > 0 {
            let level = usize::BITS - 1 - diff.leading_zeros();
            node = self.path[node][level as usize];
            diff -= 1 << level;
        }
        node
    }
}
