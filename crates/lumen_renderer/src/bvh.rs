//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The BVH owns every primitive of the scene in a flat arena; leaves refer
//! to primitives by arena index. Nodes split at the middle of their widest
//! axis and fall back to a median split when that leaves one side empty.

use std::cmp::Ordering;
use std::sync::Arc;

use lumen_math::{BoundingBox, Ray};

use crate::primitive::{Intersection, Primitive};

/// Maximum tree height; nodes at this depth become leaves.
pub const MAX_HEIGHT: usize = 20;

/// Nodes with fewer primitives than this become leaves.
pub const MIN_SPLIT: usize = 10;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        bounds: BoundingBox,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        /// Number of primitives below this node
        size: usize,
    },
    /// Leaf node holding arena indices.
    Leaf {
        bounds: BoundingBox,
        primitives: Vec<usize>,
    },
}

impl BvhNode {
    pub fn bounds(&self) -> &BoundingBox {
        match self {
            BvhNode::Branch { bounds, .. } | BvhNode::Leaf { bounds, .. } => bounds,
        }
    }

    /// Number of primitives below this node.
    pub fn size(&self) -> usize {
        match self {
            BvhNode::Branch { size, .. } => *size,
            BvhNode::Leaf { primitives, .. } => primitives.len(),
        }
    }
}

/// Closest hit found by a BVH query.
#[derive(Clone, Copy)]
pub struct BvhHit<'a> {
    pub intersection: Intersection,
    /// Arena index of the primitive that was hit
    pub index: usize,
    pub primitive: &'a dyn Primitive,
}

/// Immutable bounding volume hierarchy over shared primitives.
pub struct Bvh {
    primitives: Vec<Arc<dyn Primitive>>,
    root: Option<BvhNode>,
}

impl Bvh {
    /// Build a BVH with the default limits.
    pub fn new(primitives: Vec<Arc<dyn Primitive>>) -> Self {
        Self::with_limits(primitives, MAX_HEIGHT, MIN_SPLIT)
    }

    /// Build a BVH with an explicit height limit and leaf threshold.
    pub fn with_limits(primitives: Vec<Arc<dyn Primitive>>, max_height: usize, min_split: usize) -> Self {
        let mut indices: Vec<usize> = (0..primitives.len()).collect();
        let root = Self::build(&primitives, &mut indices, max_height, min_split.max(2));

        Self { primitives, root }
    }

    /// Recursive construction over a slice of arena indices.
    fn build(
        primitives: &[Arc<dyn Primitive>],
        indices: &mut [usize],
        height: usize,
        min_split: usize,
    ) -> Option<BvhNode> {
        let (&first, rest) = indices.split_first()?;

        let mut bounds = *primitives[first].bounds();
        for &i in rest {
            bounds.expand_box(primitives[i].bounds());
        }

        if height == 0 || indices.len() < min_split {
            log::debug!("Created leaf with {} primitives.", indices.len());
            return Some(BvhNode::Leaf {
                bounds,
                primitives: indices.to_vec(),
            });
        }

        let axis = bounds.widest_axis();
        let mid = bounds.center()[axis];
        let center = |i: usize| primitives[i].bounds().center()[axis];

        let mut split = partition(indices, |&i| center(i) < mid);

        // Everything landed on one side: median split instead.
        if split == 0 || split == indices.len() {
            indices.sort_by(|&a, &b| center(a).partial_cmp(&center(b)).unwrap_or(Ordering::Equal));
            split = indices.len() / 2;
        }

        let (left, right) = indices.split_at_mut(split);
        let left = Self::build(primitives, left, height - 1, min_split)?;
        let right = Self::build(primitives, right, height - 1, min_split)?;
        let size = left.size() + right.size();

        log::debug!("Created node with {} primitives.", size);

        Some(BvhNode::Branch {
            bounds,
            left: Box::new(left),
            right: Box::new(right),
            size,
        })
    }

    /// Find the closest primitive hit by `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<BvhHit<'_>> {
        self.intersect_node(ray, self.root.as_ref()?)
    }

    fn intersect_node(&self, ray: &Ray, node: &BvhNode) -> Option<BvhHit<'_>> {
        if !node.bounds().intersects(ray) {
            return None;
        }

        match node {
            BvhNode::Leaf { primitives, .. } => primitives
                .iter()
                .filter_map(|&index| {
                    let primitive = self.primitives[index].as_ref();
                    primitive.intersect(ray).map(|intersection| BvhHit {
                        intersection,
                        index,
                        primitive,
                    })
                })
                .min_by(|a, b| by_distance(a, b)),

            // Box tests carry no distance, so both children are searched.
            BvhNode::Branch { left, right, .. } => {
                match (self.intersect_node(ray, left), self.intersect_node(ray, right)) {
                    (Some(l), Some(r)) => Some(if r.intersection.distance < l.intersection.distance {
                        r
                    } else {
                        l
                    }),
                    (l, r) => l.or(r),
                }
            }
        }
    }

    /// Bounds of the whole scene, `None` when empty.
    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.root.as_ref().map(BvhNode::bounds)
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Primitive by arena index.
    pub fn primitive(&self, index: usize) -> Option<&Arc<dyn Primitive>> {
        self.primitives.get(index)
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

fn by_distance(a: &BvhHit<'_>, b: &BvhHit<'_>) -> Ordering {
    a.intersection
        .distance
        .partial_cmp(&b.intersection.distance)
        .unwrap_or(Ordering::Equal)
}

/// Reorder `items` so that those matching `pred` come first; returns how
/// many matched.
fn partition<T>(items: &mut [T], mut pred: impl FnMut(&T) -> bool) -> usize {
    let mut split = 0;
    for i in 0..items.len() {
        if pred(&items[i]) {
            items.swap(split, i);
            split += 1;
        }
    }
    split
}
