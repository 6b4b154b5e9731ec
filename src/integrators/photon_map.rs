// Copyright @yucwang 2026

use crate::core::kdtree::{ KdTree, NearestNeighbors };
use crate::math::constants::Vector3f;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Photon {
    /// Where the photon landed.
    pub position: Vector3f,
    /// The vertex it arrived from.
    pub source: Vector3f,
    pub throughput: RGBSpectrum,
}

/// Photons stored column-wise and indexed by landing position.
#[derive(Default)]
pub struct PhotonMap {
    positions: Vec<Vector3f>,
    sources: Vec<Vector3f>,
    throughputs: Vec<RGBSpectrum>,
    tree: Option<KdTree>,
}

impl PhotonMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, photon: Photon) {
        assert!(self.tree.is_none(), "photon map is already built");
        self.positions.push(photon.position);
        self.sources.push(photon.source);
        self.throughputs.push(photon.throughput);
    }

    /// Index the stored photons. Further pushes are rejected.
    pub fn build(&mut self) {
        self.tree = Some(KdTree::new(self.positions.clone()));
    }

    pub fn is_built(&self) -> bool {
        self.tree.is_some()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, idx: usize) -> Photon {
        Photon {
            position: self.positions[idx],
            source: self.sources[idx],
            throughput: self.throughputs[idx],
        }
    }

    /// Up to `k` photons nearest to `point`, nearest first.
    ///
    /// Panics if the map has not been built.
    pub fn query(&self, point: &Vector3f, k: usize) -> Vec<Photon> {
        let tree = self.tree.as_ref().expect("photon map must be built by preprocess before rendering");
        tree.query(point, k).into_iter().map(|idx| self.get(idx)).collect()
    }
}
