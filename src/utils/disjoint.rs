//! Union-find over dense integer ids.

/// A disjoint-set forest with union by rank.
///
/// Elements are dense ids handed out by [`DisjointSet::create`]. [`DisjointSet::find`]
/// relinks only the queried element to its root, which keeps lookups cheap without the
/// write traffic of full path compression. Each root tracks the size of its set.
///
/// The converter uses this structure to partition the nodes of an irreducible region into
/// domains: every node is united with its immediate dominator unless that dominator sits
/// outside the region.
///
/// # Examples
///
/// ```rust
/// use cfgreduce::utils::DisjointSet;
///
/// let mut sets = DisjointSet::new();
/// let a = sets.create();
/// let b = sets.create();
/// let c = sets.create();
///
/// sets.union(a, c);
/// assert_eq!(sets.find(a), sets.find(c));
/// assert_eq!(sets.set_size(c), 2);
///
/// // Dense labels in order of first appearance
/// assert_eq!(sets.pack(3), vec![0, 1, 0]);
/// # let _ = b;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u32>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Creates an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a forest of `count` singleton sets with ids `0..count`.
    #[must_use]
    pub fn with_elements(count: usize) -> Self {
        DisjointSet {
            parent: (0..count).collect(),
            rank: vec![0; count],
            size: vec![1; count],
        }
    }

    /// Adds a new singleton set and returns its id.
    pub fn create(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        self.size.push(1);
        id
    }

    /// Returns the number of elements, across all sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if no element was created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the representative of the set containing `node`.
    ///
    /// If `node` is more than one step away from its root it is relinked directly to it.
    ///
    /// # Panics
    ///
    /// Panics if `node` was not created by this forest.
    pub fn find(&mut self, node: usize) -> usize {
        let mut root = self.parent[node];
        if root == node {
            return root;
        }
        while self.parent[root] != root {
            root = self.parent[root];
        }
        self.parent[node] = root;
        root
    }

    /// Merges the sets containing `a` and `b` and returns the representative of the result.
    pub fn union(&mut self, a: usize, b: usize) -> usize {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return a;
        }

        let (root, child) = if self.rank[a] >= self.rank[b] {
            (a, b)
        } else {
            (b, a)
        };
        if self.rank[root] == self.rank[child] {
            self.rank[root] += 1;
        }
        self.parent[child] = root;
        self.size[root] += self.size[child];
        root
    }

    /// Returns the number of elements in the set containing `node`.
    pub fn set_size(&mut self, node: usize) -> usize {
        let root = self.find(node);
        self.size[root]
    }

    /// Labels the first `count` elements with dense set numbers.
    ///
    /// Sets are numbered `0, 1, ...` in the order their first element appears, so the
    /// result depends only on the partition, never on the internal forest shape.
    pub fn pack(&mut self, count: usize) -> Vec<usize> {
        let mut labels = vec![usize::MAX; self.parent.len()];
        let mut next = 0;
        let mut packed = Vec::with_capacity(count);

        for node in 0..count {
            let root = self.find(node);
            if labels[root] == usize::MAX {
                labels[root] = next;
                next += 1;
            }
            packed.push(labels[root]);
        }
        packed
    }
}
