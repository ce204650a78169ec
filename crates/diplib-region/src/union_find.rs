//! Union-find (disjoint set) with a per-set payload
//!
//! Used by labeling to record label equivalences during the first scan.
//! Element 0 is reserved for the background: it exists from the start, and
//! any set merged with it is discarded when relabeling.

/// Integer type of object labels.
pub type LabelType = u32;

/// Disjoint-set forest whose roots carry a value of type `V`, combined with
/// `merge` when two sets are joined.
///
/// The root of a set is always its lowest element, so sets merged with the
/// background (element 0) keep 0 as their root.
///
/// # Examples
///
/// ```
/// use diplib_region::UnionFind;
///
/// let mut uf = UnionFind::new(|a: &usize, b: &usize| a + b);
/// let a = uf.create(3);
/// let b = uf.create(4);
/// let c = uf.create(1);
/// uf.union(b, c);
/// assert_eq!(*uf.value(c), 5);
///
/// let map = uf.relabel();
/// assert_eq!(map.count(), 2);
/// assert_eq!(map.label(a), 1);
/// assert_eq!(map.label(c), 2);
/// ```
pub struct UnionFind<V, F> {
    parents: Vec<LabelType>,
    values: Vec<V>,
    merge: F,
}

impl<V: Default, F: Fn(&V, &V) -> V> UnionFind<V, F> {
    /// An empty forest holding only the background element.
    pub fn new(merge: F) -> Self {
        Self::with_capacity(0, merge)
    }

    /// As [`UnionFind::new`], reserving room for `n` elements.
    pub fn with_capacity(n: usize, merge: F) -> Self {
        let mut parents = Vec::with_capacity(n + 1);
        let mut values = Vec::with_capacity(n + 1);
        parents.push(0);
        values.push(V::default());
        UnionFind {
            parents,
            values,
            merge,
        }
    }

    /// Add a new singleton set with payload `value`, returning its element.
    pub fn create(&mut self, value: V) -> LabelType {
        let index = self.parents.len() as LabelType;
        self.parents.push(index);
        self.values.push(value);
        index
    }

    /// Number of elements created, excluding the background.
    pub fn len(&self) -> usize {
        self.parents.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root of the set containing `index`, compressing the path on the way.
    pub fn find_root(&mut self, index: LabelType) -> LabelType {
        let mut root = index;
        while self.parents[root as usize] != root {
            root = self.parents[root as usize];
        }
        let mut i = index;
        while self.parents[i as usize] != root {
            let next = self.parents[i as usize];
            self.parents[i as usize] = root;
            i = next;
        }
        root
    }

    /// Payload of the set containing `index`.
    pub fn value(&mut self, index: LabelType) -> &V {
        let root = self.find_root(index);
        &self.values[root as usize]
    }

    /// Mutable payload of the set containing `index`.
    pub fn value_mut(&mut self, index: LabelType) -> &mut V {
        let root = self.find_root(index);
        &mut self.values[root as usize]
    }

    /// Join the sets containing `a` and `b`, returning the root of the union.
    pub fn union(&mut self, a: LabelType, b: LabelType) -> LabelType {
        let ra = self.find_root(a);
        let rb = self.find_root(b);
        if ra == rb {
            return ra;
        }
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        let merged = (self.merge)(&self.values[root as usize], &self.values[child as usize]);
        self.values[root as usize] = merged;
        self.parents[child as usize] = root;
        root
    }

    /// Assign consecutive labels, starting at 1, to every set except the
    /// background.
    pub fn relabel(self) -> LabelMap {
        self.relabel_if(|_| true)
    }

    /// Assign consecutive labels to the sets whose payload satisfies
    /// `keep`; every other set, and the background, maps to 0.
    pub fn relabel_if(mut self, keep: impl Fn(&V) -> bool) -> LabelMap {
        let n = self.parents.len();
        let mut new_labels = vec![0 as LabelType; n];
        let mut count: LabelType = 0;
        for i in 1..n {
            if self.parents[i] == i as LabelType && keep(&self.values[i]) {
                count += 1;
                new_labels[i] = count;
            }
        }
        let map = (0..n)
            .map(|i| {
                let root = self.find_root(i as LabelType);
                new_labels[root as usize]
            })
            .collect();
        LabelMap {
            map,
            count: count as usize,
        }
    }
}

/// Mapping from union-find elements to final, consecutive labels.
#[derive(Debug, Clone)]
pub struct LabelMap {
    map: Vec<LabelType>,
    count: usize,
}

impl LabelMap {
    /// Final label of `index`, 0 if its set was discarded.
    pub fn label(&self, index: LabelType) -> LabelType {
        self.map.get(index as usize).copied().unwrap_or(0)
    }

    /// Number of distinct non-zero labels.
    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> UnionFind<usize, impl Fn(&usize, &usize) -> usize> {
        UnionFind::new(|a: &usize, b: &usize| a + b)
    }

    #[test]
    fn test_union_keeps_lowest_root() {
        let mut uf = sizes();
        let a = uf.create(1);
        let b = uf.create(1);
        let c = uf.create(1);
        assert_eq!(uf.union(c, b), b);
        assert_eq!(uf.union(c, a), a);
        assert_eq!(uf.find_root(c), a);
        assert_eq!(*uf.value(b), 3);
        // joining twice does not count twice
        uf.union(a, c);
        assert_eq!(*uf.value(a), 3);
    }

    #[test]
    fn test_merged_with_background_is_dropped() {
        let mut uf = sizes();
        let a = uf.create(2);
        let b = uf.create(5);
        uf.union(b, 0);
        let map = uf.relabel();
        assert_eq!(map.count(), 1);
        assert_eq!(map.label(a), 1);
        assert_eq!(map.label(b), 0);
        assert_eq!(map.label(0), 0);
    }

    #[test]
    fn test_relabel_if_filters_on_payload() {
        let mut uf = sizes();
        let small = uf.create(1);
        let big = uf.create(4);
        let other = uf.create(3);
        uf.union(big, other);
        let map = uf.relabel_if(|&size| size >= 2);
        assert_eq!(map.count(), 1);
        assert_eq!(map.label(small), 0);
        assert_eq!(map.label(other), 1);
    }
}
