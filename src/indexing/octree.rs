//! Octree index over mesh nodes, with optional element connectivity.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use log::{debug, info};
use rayon::prelude::*;

use crate::constants::{INITIAL_TOLERANCE_SLACK, MAX_RELAXATION_ROUNDS, RELAXATION_STEP};
use crate::indexing::octant::Octant;
use crate::maths::distance::{average_distance_squared, distance, distance_squared};
use crate::maths::element_type::{determine_element_type, ElementType};
use crate::maths::geometry::{element_containment, MuesfData};
use crate::maths::vector3::Vector3;
use crate::maths::z_ordering::determine_direction;
use crate::types::{Error, RealScalar, Result};

/// Heap entry for best-first traversals: an octant keyed by the minimum
/// possible squared distance from its box to the query point.
///
/// The ordering is reversed so that `BinaryHeap` pops the smallest bound
/// first (a min-heap).
struct HeapEntry<'a, T: RealScalar> {
    bound: T,
    octant: &'a Octant<T>,
}

impl<T: RealScalar> PartialEq for HeapEntry<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.bound == other.bound
    }
}

impl<T: RealScalar> Eq for HeapEntry<'_, T> {}

impl<T: RealScalar> PartialOrd for HeapEntry<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: RealScalar> Ord for HeapEntry<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Bounds are finite by construction; ties are fine either way.
        other
            .bound
            .partial_cmp(&self.bound)
            .unwrap_or(Ordering::Equal)
    }
}

/// Build-once/read-many octree over a borrowed point array, optionally
/// annotated with borrowed element connectivity.
///
/// The tree never mutates after construction: there is no insertion,
/// deletion or rebalancing API, so any number of concurrent readers may
/// query it without locking. The borrowed arrays must outlive the tree,
/// which the lifetime parameter enforces.
pub struct Octree<'a, T: RealScalar> {
    root: Octant<T>,
    points: &'a [Vector3<T>],
    elements: Option<&'a [Vec<usize>]>,
    /// Point id -> ids of the elements touching that point.
    node_elements: Vec<Vec<usize>>,
    element_type: Option<ElementType>,
    leaf_split_threshold: usize,
    max_depth: usize,
}

impl<'a, T: RealScalar> Octree<'a, T> {
    /// Builds a node index over `points`.
    ///
    /// Fails with [`Error::EmptyInput`] when `points` is empty.
    pub fn new(
        points: &'a [Vector3<T>],
        max_depth: usize,
        leaf_split_threshold: usize,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        let root = fit_root(points);
        let mut octree = Self {
            root,
            points,
            elements: None,
            node_elements: Vec::new(),
            element_type: None,
            leaf_split_threshold,
            max_depth,
        };
        octree.insert_all();
        info!(
            "octree node index: {} points, max depth {}, leaf split threshold {}, root center {}",
            points.len(),
            max_depth,
            leaf_split_threshold,
            octree.root.center
        );
        Ok(octree)
    }

    /// Builds an element index over `points` and `elements`.
    ///
    /// Every node index inside `elements` must be a valid index into
    /// `points`. Fails with [`Error::EmptyInput`] or
    /// [`Error::EmptyElements`] on empty inputs, and with
    /// [`Error::UnsupportedElementArity`] when the mesh's nodes-per-element
    /// count is not 4, 6 or 8.
    pub fn with_elements(
        points: &'a [Vector3<T>],
        elements: &'a [Vec<usize>],
        max_depth: usize,
        leaf_split_threshold: usize,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        if elements.is_empty() {
            return Err(Error::EmptyElements);
        }
        let element_type = determine_element_type(elements)?;
        let root = fit_root(points);
        let mut octree = Self {
            root,
            points,
            elements: Some(elements),
            node_elements: node_element_map(points.len(), elements),
            element_type: Some(element_type),
            leaf_split_threshold,
            max_depth,
        };
        octree.insert_all();
        info!(
            "octree element index: {} points, {} {} elements, max depth {}, leaf split threshold {}",
            points.len(),
            elements.len(),
            element_type,
            max_depth,
            leaf_split_threshold
        );
        Ok(octree)
    }

    /// As [`Octree::new`], computing the bounding box with a parallel
    /// reduction. Point insertion itself stays sequential: the tree is
    /// single-writer during construction by design, so no per-node
    /// synchronization is needed.
    pub fn par_new(
        points: &'a [Vector3<T>],
        max_depth: usize,
        leaf_split_threshold: usize,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        let root = par_fit_root(points);
        let mut octree = Self {
            root,
            points,
            elements: None,
            node_elements: Vec::new(),
            element_type: None,
            leaf_split_threshold,
            max_depth,
        };
        octree.insert_all();
        Ok(octree)
    }

    /// As [`Octree::with_elements`], computing the bounding box and the
    /// node-to-element adjacency with parallel reductions.
    pub fn par_with_elements(
        points: &'a [Vector3<T>],
        elements: &'a [Vec<usize>],
        max_depth: usize,
        leaf_split_threshold: usize,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        if elements.is_empty() {
            return Err(Error::EmptyElements);
        }
        let element_type = determine_element_type(elements)?;
        let root = par_fit_root(points);
        let mut octree = Self {
            root,
            points,
            elements: Some(elements),
            node_elements: par_node_element_map(points.len(), elements),
            element_type: Some(element_type),
            leaf_split_threshold,
            max_depth,
        };
        octree.insert_all();
        Ok(octree)
    }

    fn insert_all(&mut self) {
        for point_id in 0..self.points.len() {
            insert(
                &mut self.root,
                self.points,
                point_id,
                0,
                self.leaf_split_threshold,
                self.max_depth,
            );
        }
    }

    /// Center and half-extent of the root octant.
    pub fn root(&self) -> (Vector3<T>, Vector3<T>) {
        (self.root.center, self.root.extent)
    }

    /// Element type of the indexed mesh, when an element index was built.
    pub fn element_type(&self) -> Option<ElementType> {
        self.element_type
    }

    /// Point id -> element id adjacency, empty without an element index.
    pub fn node_elements(&self) -> &[Vec<usize>] {
        &self.node_elements
    }

    /// Exact-match lookup: descends to the unique leaf that would hold the
    /// point and scans its bucket for componentwise equality.
    ///
    /// A miss is a normal negative result, used by the interpolation
    /// drivers to short-circuit when source and target meshes coincide at
    /// a node.
    pub fn find(&self, point: &Vector3<T>) -> Option<usize> {
        let mut octant = &self.root;
        while let Some(children) = &octant.children {
            octant = &children[octant.child_octant(point) as usize];
        }
        octant
            .points
            .iter()
            .copied()
            .find(|&p| self.points[p] == *point)
    }

    /// Index of the point nearest to `query`, by best-first
    /// branch-and-bound.
    ///
    /// Octants are visited in order of their minimum possible squared
    /// distance to the query; the search stops as soon as that bound can
    /// no longer beat the best point seen, so no closer point remains
    /// unexplored.
    pub fn nearest(&self, query: &Vector3<T>) -> usize {
        let mut best = 0;
        let mut best_distance_squared = T::max_value();
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry {
            bound: self.root.minimum_distance_squared(query),
            octant: &self.root,
        });

        while let Some(entry) = heap.pop() {
            if entry.bound >= best_distance_squared {
                break;
            }
            match &entry.octant.children {
                Some(children) => {
                    for child in children.iter() {
                        heap.push(HeapEntry {
                            bound: child.minimum_distance_squared(query),
                            octant: child,
                        });
                    }
                }
                None => {
                    for &p in &entry.octant.points {
                        let d = distance_squared(query, &self.points[p]);
                        if d < best_distance_squared {
                            best = p;
                            best_distance_squared = d;
                        }
                    }
                }
            }
        }

        best
    }

    /// Indices of every point within `radius` of `query`.
    ///
    /// Octants are pruned by sphere overlap and candidate points are then
    /// filtered exactly against the radius, so the result is precisely the
    /// brute-force subset.
    pub fn radius_search(&self, query: &Vector3<T>, radius: T) -> Vec<usize> {
        let mut results = Vec::new();
        let radius_squared = radius * radius;
        radius_search_octant(
            &self.root,
            self.points,
            query,
            radius,
            radius_squared,
            &mut results,
        );
        results
    }

    /// For each of the 8 directions around `query`, the closest point
    /// within `max_radius`, as (point index, Euclidean distance).
    ///
    /// Directions with no candidate inside the radius stay `None`.
    pub fn field_of_points(
        &self,
        query: &Vector3<T>,
        max_radius: T,
    ) -> [Option<(usize, T)>; 8] {
        let mut field: [Option<(usize, T)>; 8] = [None; 8];
        for p in self.radius_search(query, max_radius) {
            let dir = determine_direction(query, &self.points[p]) as usize;
            let d = distance(query, &self.points[p]);
            match field[dir] {
                Some((_, current)) if current <= d => {}
                _ => field[dir] = Some((p, d)),
            }
        }
        field
    }

    /// Id of the element with the smallest average squared distance from
    /// `query` to its nodes, scanning up to `scan_budget` distinct
    /// elements in best-first leaf order.
    ///
    /// Preconditions: the tree was built with an element index and
    /// `scan_budget >= 1`; with no element index this degenerates to
    /// element 0.
    pub fn dmue(&self, query: &Vector3<T>, scan_budget: usize) -> usize {
        let elements = self.elements.unwrap_or(&[]);
        let mut best_element = 0;
        let mut best_distance_squared = T::max_value();
        let mut scanned = 0;
        let mut considered = HashSet::new();
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry {
            bound: self.root.minimum_distance_squared(query),
            octant: &self.root,
        });

        while let Some(entry) = heap.pop() {
            if scanned >= scan_budget {
                break;
            }
            match &entry.octant.children {
                Some(children) => {
                    for child in children.iter() {
                        heap.push(HeapEntry {
                            bound: child.minimum_distance_squared(query),
                            octant: child,
                        });
                    }
                }
                None => {
                    for &p in &entry.octant.points {
                        for &e in &self.node_elements[p] {
                            if !considered.insert(e) {
                                continue;
                            }
                            scanned += 1;
                            let d = average_distance_squared(&elements[e], self.points, query);
                            if d < best_distance_squared {
                                best_distance_squared = d;
                                best_element = e;
                            }
                        }
                    }
                }
            }
        }

        debug!(
            "element {} selected, average squared distance {}, {} elements scanned",
            best_element, best_distance_squared, scanned
        );
        best_element
    }

    /// Finds an element geometrically containing `query`, returning its id
    /// and the parametric coordinates of the query point inside it.
    ///
    /// Best-first leaf order, scanning at most `leaf_scan_budget` leaves
    /// per round; when a round exhausts the budget or the whole tree
    /// without a hit, the search restarts from the root with every
    /// containment tolerance window widened by
    /// [`RELAXATION_STEP`]. Source and target
    /// geometries that never overlap near the query point would relax
    /// forever; after [`MAX_RELAXATION_ROUNDS`]
    /// rounds the point is reported as [`Error::Unmappable`].
    ///
    /// Precondition: the tree was built with an element index.
    pub fn muesf(
        &self,
        query: &Vector3<T>,
        leaf_scan_budget: usize,
    ) -> Result<(usize, MuesfData<T>)> {
        let elements = self.elements.unwrap_or(&[]);
        let element_type = self
            .element_type
            .expect("containment search requires an element index");
        let mut considered = HashSet::new();

        for round in 0..=MAX_RELAXATION_ROUNDS {
            let slack =
                T::from(INITIAL_TOLERANCE_SLACK + RELAXATION_STEP * round as f64).unwrap();
            if round > 0 {
                debug!(
                    "containment search relaxed: round {}, tolerance slack {}",
                    round, slack
                );
            }
            considered.clear();
            let mut scanned_leaves = 0;
            let mut heap = BinaryHeap::new();
            heap.push(HeapEntry {
                bound: self.root.minimum_distance_squared(query),
                octant: &self.root,
            });

            while let Some(entry) = heap.pop() {
                match &entry.octant.children {
                    Some(children) => {
                        for child in children.iter() {
                            heap.push(HeapEntry {
                                bound: child.minimum_distance_squared(query),
                                octant: child,
                            });
                        }
                    }
                    None => {
                        if scanned_leaves >= leaf_scan_budget {
                            break;
                        }
                        scanned_leaves += 1;
                        for &p in &entry.octant.points {
                            for &e in &self.node_elements[p] {
                                if !considered.insert(e) {
                                    continue;
                                }
                                if let Some(data) = element_containment(
                                    element_type,
                                    self.points,
                                    &elements[e],
                                    query,
                                    slack,
                                ) {
                                    return Ok((e, data));
                                }
                            }
                        }
                    }
                }
            }
        }

        Err(Error::Unmappable {
            rounds: MAX_RELAXATION_ROUNDS,
        })
    }

    /// Post-order traversal over every octant, leaves before parents.
    ///
    /// Empty leaves are included, so the iterator visits exactly the
    /// number of octants the construction created.
    pub fn post_order(&self) -> PostOrderIter<'_, T> {
        PostOrderIter::new(&self.root)
    }
}

impl<T: RealScalar> Drop for Octree<'_, T> {
    /// Iterative teardown. A derived drop would recurse through the
    /// child chain and can exhaust the stack on trees with millions of
    /// octants.
    fn drop(&mut self) {
        let mut stack: Vec<Octant<T>> = Vec::new();
        if let Some(children) = self.root.children.take() {
            stack.extend(*children);
        }
        while let Some(mut octant) = stack.pop() {
            if let Some(children) = octant.children.take() {
                stack.extend(*children);
            }
        }
    }
}

/// Post-order octant iterator, built with the classic two-stack scheme.
pub struct PostOrderIter<'a, T: RealScalar> {
    ordered: Vec<&'a Octant<T>>,
}

impl<'a, T: RealScalar> PostOrderIter<'a, T> {
    fn new(root: &'a Octant<T>) -> Self {
        let mut visit = vec![root];
        let mut ordered = Vec::new();
        while let Some(octant) = visit.pop() {
            ordered.push(octant);
            if let Some(children) = &octant.children {
                for child in children.iter() {
                    visit.push(child);
                }
            }
        }
        Self { ordered }
    }
}

impl<'a, T: RealScalar> Iterator for PostOrderIter<'a, T> {
    type Item = &'a Octant<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ordered.pop()
    }
}

/// Collects points within the sphere, pruning subtrees whose box misses
/// it entirely.
fn radius_search_octant<T: RealScalar>(
    octant: &Octant<T>,
    points: &[Vector3<T>],
    query: &Vector3<T>,
    radius: T,
    radius_squared: T,
    results: &mut Vec<usize>,
) {
    match &octant.children {
        Some(children) => {
            for child in children.iter() {
                if child.within_sphere(query, radius, radius_squared) {
                    radius_search_octant(child, points, query, radius, radius_squared, results);
                }
            }
        }
        None => {
            for &p in &octant.points {
                if distance_squared(query, &points[p]) <= radius_squared {
                    results.push(p);
                }
            }
        }
    }
}

/// Fits the root octant to the axis-aligned bounding box of `points`.
fn fit_root<T: RealScalar>(points: &[Vector3<T>]) -> Octant<T> {
    let init = (
        Vector3::splat(T::max_value()),
        Vector3::splat(T::min_value()),
    );
    let (min, max) = points
        .iter()
        .fold(init, |(mn, mx), p| (merge_min(mn, p), merge_max(mx, p)));
    root_from_bounds(min, max)
}

/// As [`fit_root`], reducing the bounding box in parallel.
fn par_fit_root<T: RealScalar>(points: &[Vector3<T>]) -> Octant<T> {
    let identity = || {
        (
            Vector3::splat(T::max_value()),
            Vector3::splat(T::min_value()),
        )
    };
    let (min, max) = points
        .par_iter()
        .fold(identity, |(mn, mx), p| (merge_min(mn, p), merge_max(mx, p)))
        .reduce(identity, |(amin, amax), (bmin, bmax)| {
            (merge_min(amin, &bmin), merge_max(amax, &bmax))
        });
    root_from_bounds(min, max)
}

fn merge_min<T: RealScalar>(mn: Vector3<T>, p: &Vector3<T>) -> Vector3<T> {
    Vector3::new(mn.x.min(p.x), mn.y.min(p.y), mn.z.min(p.z))
}

fn merge_max<T: RealScalar>(mx: Vector3<T>, p: &Vector3<T>) -> Vector3<T> {
    Vector3::new(mx.x.max(p.x), mx.y.max(p.y), mx.z.max(p.z))
}

fn root_from_bounds<T: RealScalar>(min: Vector3<T>, max: Vector3<T>) -> Octant<T> {
    let two = T::from(2.0).unwrap();
    let center = (max + min) / two;
    let extent = (max - min) / two;
    Octant::new(center, extent)
}

/// Builds the point id -> element ids adjacency sequentially.
fn node_element_map(points_len: usize, elements: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut map = vec![Vec::new(); points_len];
    for (e, element) in elements.iter().enumerate() {
        for &n in element {
            map[n].push(e);
        }
    }
    map
}

/// Builds the adjacency with a parallel fold over element chunks; per-node
/// element id order is unspecified, which no query depends on.
fn par_node_element_map(points_len: usize, elements: &[Vec<usize>]) -> Vec<Vec<usize>> {
    elements
        .par_iter()
        .enumerate()
        .fold(
            || vec![Vec::new(); points_len],
            |mut map, (e, element)| {
                for &n in element {
                    map[n].push(e);
                }
                map
            },
        )
        .reduce(
            || vec![Vec::new(); points_len],
            |mut a, mut b| {
                for (into, from) in a.iter_mut().zip(b.iter_mut()) {
                    into.append(from);
                }
                a
            },
        )
}

/// Inserts a point index starting from `octant`.
///
/// A leaf absorbs the point while it is under the split threshold or at
/// the maximum depth; otherwise it splits first. A branch descends into
/// the child selected by the direction code.
fn insert<T: RealScalar>(
    octant: &mut Octant<T>,
    points: &[Vector3<T>],
    point_id: usize,
    depth: usize,
    leaf_split_threshold: usize,
    max_depth: usize,
) {
    if octant.is_leaf() {
        if octant.points.len() < leaf_split_threshold || depth == max_depth {
            octant.points.push(point_id);
            return;
        }
        return split(octant, points, point_id, depth, leaf_split_threshold, max_depth);
    }
    let slot = octant.child_octant(&points[point_id]) as usize;
    let children = octant.children.as_mut().unwrap();
    insert(
        &mut children[slot],
        points,
        point_id,
        depth + 1,
        leaf_split_threshold,
        max_depth,
    );
}

/// Splits a leaf into 8 children and re-inserts its bucket plus the new
/// point through the now-branch octant.
///
/// Child centers are offset by half the parent's extent per axis, with the
/// offset signs matching the direction code bit layout (x = 4, y = 2,
/// z = 1).
fn split<T: RealScalar>(
    octant: &mut Octant<T>,
    points: &[Vector3<T>],
    point_id: usize,
    depth: usize,
    leaf_split_threshold: usize,
    max_depth: usize,
) {
    let current_points = std::mem::take(&mut octant.points);
    let half = T::from(0.5).unwrap();

    let center = octant.center;
    let extent = octant.extent;
    let children: [Octant<T>; 8] = std::array::from_fn(|i| {
        let offset = Vector3::new(
            extent.x * if i & 4 != 0 { half } else { -half },
            extent.y * if i & 2 != 0 { half } else { -half },
            extent.z * if i & 1 != 0 { half } else { -half },
        );
        Octant::new(center + offset, extent * half)
    });
    octant.children = Some(Box::new(children));

    for p in current_points {
        insert(octant, points, p, depth, leaf_split_threshold, max_depth);
    }
    insert(octant, points, point_id, depth, leaf_split_threshold, max_depth);
}
