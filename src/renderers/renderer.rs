// Copyright @yucwang 2021

use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;

pub trait Renderer {
    /// Runs the integrator's preprocess once, then renders every pass.
    fn render(&mut self, scene: &Scene) -> Bitmap;
}
