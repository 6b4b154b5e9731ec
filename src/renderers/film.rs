// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

use std::sync::{ Mutex, PoisonError };

/// Finished radiance estimates for a rectangle `[x0, x1) x [y0, y1)`.
pub struct Tile {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
    pub pixels: Vec<RGBSpectrum>,
}

impl Tile {
    pub fn new(x0: usize, y0: usize, x1: usize, y1: usize) -> Self {
        Self { x0, y0, x1, y1, pixels: vec![RGBSpectrum::default(); (x1 - x0) * (y1 - y0)] }
    }

    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn set(&mut self, x: usize, y: usize, value: RGBSpectrum) {
        let w = self.width();
        self.pixels[(x - self.x0) + w * (y - self.y0)] = value;
    }
}

struct Accumulation {
    sum: Vec<RGBSpectrum>,
    count: Vec<u32>,
}

/// Running per-pixel sums shared by the render workers. Tiles are committed
/// whole and snapshots are taken under the same lock, so a snapshot never
/// observes a half-written tile.
pub struct Film {
    width: usize,
    height: usize,
    accumulation: Mutex<Accumulation>,
}

impl Film {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            accumulation: Mutex::new(Accumulation {
                sum: vec![RGBSpectrum::default(); width * height],
                count: vec![0; width * height],
            }),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Adds one sample to every pixel covered by `tile`.
    pub fn commit_tile(&self, tile: &Tile) {
        let mut acc = self.accumulation.lock().unwrap_or_else(PoisonError::into_inner);
        let w = tile.width();
        for y in tile.y0..tile.y1 {
            for x in tile.x0..tile.x1 {
                let idx = x + self.width * y;
                acc.sum[idx] += tile.pixels[(x - tile.x0) + w * (y - tile.y0)];
                acc.count[idx] += 1;
            }
        }
    }

    /// Per-pixel mean of everything committed so far.
    pub fn snapshot(&self) -> Bitmap {
        let acc = self.accumulation.lock().unwrap_or_else(PoisonError::into_inner);
        let mut bitmap = Bitmap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = x + self.width * y;
                if acc.count[idx] > 0 {
                    bitmap[(x, y)] = acc.sum[idx] / acc.count[idx] as Float;
                }
            }
        }
        bitmap
    }
}
