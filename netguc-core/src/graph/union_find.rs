//! Disjoint-set forest used to count connected components.
//!
//! Union by rank with path halving. Ties between equal ranks attach the larger
//! root under the smaller one so component representatives are stable for a
//! given insertion order.

pub(super) struct UnionFind {
    parents: Vec<usize>,
    ranks: Vec<u8>,
    components: usize,
}

impl UnionFind {
    pub(super) fn new(node_count: usize) -> Self {
        Self {
            parents: (0..node_count).collect(),
            ranks: vec![0; node_count],
            components: node_count,
        }
    }

    pub(super) fn components(&self) -> usize {
        self.components
    }

    /// Merges the sets holding `left` and `right`, returning `true` when they
    /// were previously disjoint.
    pub(super) fn union(&mut self, left: usize, right: usize) -> bool {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return false;
        }

        let (parent, child) = choose_parent_child(
            left_root,
            right_root,
            self.ranks[left_root],
            self.ranks[right_root],
        );
        self.parents[child] = parent;
        if self.ranks[left_root] == self.ranks[right_root] {
            self.ranks[parent] = self.ranks[parent].saturating_add(1);
        }
        self.components -= 1;
        true
    }

    fn find(&mut self, node: usize) -> usize {
        let mut current = node;
        loop {
            let parent = self.parents[current];
            if parent == current {
                return current;
            }
            let grandparent = self.parents[parent];
            self.parents[current] = grandparent;
            current = grandparent;
        }
    }
}

fn choose_parent_child(
    left_root: usize,
    right_root: usize,
    left_rank: u8,
    right_rank: u8,
) -> (usize, usize) {
    if left_rank > right_rank {
        return (left_root, right_root);
    }
    if right_rank > left_rank {
        return (right_root, left_root);
    }
    if left_root <= right_root {
        (left_root, right_root)
    } else {
        (right_root, left_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_reports_whether_sets_merged() {
        let mut sets = UnionFind::new(4);
        assert!(sets.union(0, 1));
        assert!(!sets.union(1, 0));
        assert!(sets.union(2, 3));
        assert_eq!(sets.components(), 2);
        assert!(sets.union(0, 3));
        assert_eq!(sets.components(), 1);
    }

    #[test]
    fn empty_forest_has_no_components() {
        assert_eq!(UnionFind::new(0).components(), 0);
    }
}
