// Copyright @yucwang 2021

pub mod film;
pub mod renderer;
pub mod simple;
