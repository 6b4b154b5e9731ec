// Copyright @yucwang 2021

pub mod bounce_controller;
pub mod bsdf;
pub mod emitter;
pub mod integrator;
pub mod interaction;
pub mod kdtree;
pub mod medium;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod shape;
pub mod trace;
