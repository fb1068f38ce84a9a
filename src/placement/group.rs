//! Overlap detection and grouping.

/// Index pairs `(i, j)` with `i < j` whose positions sit closer than `buffer`.
pub(crate) fn overlapping_pairs(positions: &[(f64, f64)], buffer: f64) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let (xi, yi) = positions[i];
            let (xj, yj) = positions[j];
            if (xi - xj).hypot(yi - yj) < buffer {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Connected components of the overlap graph, each sorted by index.
///
/// Components are returned in order of their smallest member; singletons are
/// omitted.
pub(crate) fn partition_groups(len: usize, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut sets = DisjointSets::new(len);
    for &(a, b) in pairs {
        sets.union(a, b);
    }

    let mut slot_of_root = vec![usize::MAX; len];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for idx in 0..len {
        let root = sets.find(idx);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[root]].push(idx);
    }
    groups.retain(|group| group.len() > 1);
    groups
}

/// One group per point, in point order: the point itself first, then every
/// point it overlaps in index order. Points without neighbours produce no
/// group.
pub(crate) fn per_point_groups(len: usize, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut neighbours: Vec<Vec<usize>> = (0..len).map(|idx| vec![idx]).collect();
    for &(a, b) in pairs {
        neighbours[a].push(b);
        neighbours[b].push(a);
    }
    neighbours
        .into_iter()
        .filter(|group| group.len() > 1)
        .map(|mut group| {
            group[1..].sort_unstable();
            group
        })
        .collect()
}

struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, idx: usize) -> usize {
        let mut root = idx;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = idx;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_use_strict_threshold() {
        let pairs = overlapping_pairs(&[(0.0, 0.0), (0.5, 0.0), (0.2, 0.0)], 0.5);
        assert_eq!(pairs, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_partition_merges_chains() {
        // 0-1 and 1-2 overlap, 0-2 do not
        let groups = partition_groups(4, &[(0, 1), (1, 2)]);
        assert_eq!(groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_partition_keeps_components_apart() {
        let groups = partition_groups(5, &[(3, 4), (0, 2)]);
        assert_eq!(groups, vec![vec![0, 2], vec![3, 4]]);
    }

    #[test]
    fn test_per_point_groups_lead_with_their_own_point() {
        let groups = per_point_groups(3, &[(0, 1), (1, 2)]);
        assert_eq!(groups, vec![vec![0, 1], vec![1, 0, 2], vec![2, 1]]);
    }

    #[test]
    fn test_per_point_neighbours_follow_index_order() {
        let groups = per_point_groups(4, &[(2, 3), (0, 3), (1, 3)]);
        assert_eq!(groups.last().unwrap(), &vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_no_pairs_no_groups() {
        assert!(partition_groups(3, &[]).is_empty());
        assert!(per_point_groups(3, &[]).is_empty());
    }
}
