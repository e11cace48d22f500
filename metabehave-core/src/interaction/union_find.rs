//! Union-find (disjoint set union) used by the giant-component sweep.
//!
//! The sweep replays edges from the heaviest to the lightest and merges
//! components as they appear. Alongside the usual rank heuristic the set
//! tracks component sizes so the largest component is known after every
//! merge without rescanning.

#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    size: Vec<usize>,
    components: usize,
    largest: usize,
}

impl DisjointSet {
    pub(super) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            size: vec![1; n],
            components: n,
            largest: usize::from(n > 0),
        }
    }

    pub(super) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges the sets holding `left` and `right`; returns `false` when they
    /// were already joined.
    pub(super) fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return false;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        self.size[left] += self.size[right];
        self.largest = self.largest.max(self.size[left]);
        self.components -= 1;
        true
    }

    pub(super) const fn components(&self) -> usize {
        self.components
    }

    pub(super) const fn largest(&self) -> usize {
        self.largest
    }
}
