// Copyright @yucwang 2026

pub mod exr_utils;
pub mod image_utils;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to write exr {path}: {message}")]
    ExrWrite { path: String, message: String },
    #[error("failed to read exr {path}: {message}")]
    ExrRead { path: String, message: String },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("image {0} has zero size")]
    Empty(String),
}
