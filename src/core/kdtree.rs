// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const MAX_LEAF_SIZE: usize = 10;

/// Narrow k-nearest-neighbour interface over an indexed point set.
pub trait NearestNeighbors: Send + Sync {
    /// Indices of up to `k` points closest to `point`, nearest first.
    fn query(&self, point: &Vector3f, k: usize) -> Vec<usize>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
struct KdNode {
    axis: usize,
    split: Float,
    left: Option<usize>,
    right: Option<usize>,
    start: usize,
    count: usize,
}

impl KdNode {
    fn leaf(start: usize, count: usize) -> Self {
        Self { axis: 0, split: 0.0, left: None, right: None, start, count }
    }

    fn interior(axis: usize, split: Float, left: usize, right: usize) -> Self {
        Self { axis, split, left: Some(left), right: Some(right), start: 0, count: 0 }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

#[derive(Copy, Clone)]
struct Candidate {
    dist2: Float,
    idx: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2.partial_cmp(&other.dist2)
            .unwrap_or(Ordering::Equal)
            .then(self.idx.cmp(&other.idx))
    }
}

/// Static 3-d tree over a point cloud. Built once, read-only afterwards.
pub struct KdTree {
    points: Vec<Vector3f>,
    indices: Vec<usize>,
    nodes: Vec<KdNode>,
}

impl KdTree {
    pub fn new(points: Vec<Vector3f>) -> Self {
        let mut tree = Self {
            indices: (0..points.len()).collect(),
            points,
            nodes: Vec::new(),
        };
        if !tree.indices.is_empty() {
            tree.build(0, tree.indices.len());
        }
        tree
    }

    pub fn point(&self, idx: usize) -> Vector3f {
        self.points[idx]
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let count = end - start;
        if count <= MAX_LEAF_SIZE {
            let node_idx = self.nodes.len();
            self.nodes.push(KdNode::leaf(start, count));
            return node_idx;
        }

        let mut p_min = Vector3f::repeat(Float::MAX);
        let mut p_max = Vector3f::repeat(-Float::MAX);
        for &idx in &self.indices[start..end] {
            p_min = p_min.inf(&self.points[idx]);
            p_max = p_max.sup(&self.points[idx]);
        }
        let axis = (p_max - p_min).imax();
        if p_max[axis] - p_min[axis] <= 0.0 {
            // all points coincide
            let node_idx = self.nodes.len();
            self.nodes.push(KdNode::leaf(start, count));
            return node_idx;
        }

        let mid = start + count / 2;
        {
            let points = &self.points;
            self.indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
                points[*a][axis].partial_cmp(&points[*b][axis]).unwrap_or(Ordering::Equal)
            });
        }
        let split = self.points[self.indices[mid]][axis];

        let node_idx = self.nodes.len();
        self.nodes.push(KdNode::leaf(start, count));
        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[node_idx] = KdNode::interior(axis, split, left, right);
        node_idx
    }
}

impl NearestNeighbors for KdTree {
    fn query(&self, point: &Vector3f, k: usize) -> Vec<usize> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let mut best: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        // (node, squared distance from the query to the node's half-space)
        let mut stack: Vec<(usize, Float)> = vec![(0, 0.0)];

        while let Some((node_idx, bound2)) = stack.pop() {
            if best.len() == k {
                if let Some(worst) = best.peek() {
                    if bound2 > worst.dist2 {
                        continue;
                    }
                }
            }

            let node = &self.nodes[node_idx];
            if node.is_leaf() {
                for &idx in &self.indices[node.start..node.start + node.count] {
                    let dist2 = (self.points[idx] - point).norm_squared();
                    if best.len() < k {
                        best.push(Candidate { dist2, idx });
                    } else if let Some(worst) = best.peek() {
                        if dist2 < worst.dist2 {
                            best.pop();
                            best.push(Candidate { dist2, idx });
                        }
                    }
                }
                continue;
            }

            let delta = point[node.axis] - node.split;
            let (near, far) = if delta < 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            // far side first so the near side is popped next
            if let Some(far) = far {
                stack.push((far, bound2.max(delta * delta)));
            }
            if let Some(near) = near {
                stack.push((near, bound2));
            }
        }

        best.into_sorted_vec().into_iter().map(|c| c.idx).collect()
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
