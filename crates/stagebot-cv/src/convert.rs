//! Image conversions between the `image` crate and OpenCV using opencv-match
//!
//! The matcher works on grayscale Mats; captures and reference images
//! travel as RGBA buffers. Conversions must not reorder confidence ranking,
//! so they go through opencv-match's lossless paths.

use anyhow::Context;
use opencv::core::Mat;
use opencv_match::prelude::*;

use crate::Result;

/// Convert an RGBA image to an OpenCV Mat.
pub fn rgba_to_mat(rgba_image: &image::RgbaImage) -> Result<Mat> {
    rgba_image
        .try_into_cv()
        .context("Failed to convert RGBA image to OpenCV Mat")
}

/// Convert an RGBA image to a grayscale Mat for matching.
pub fn rgba_to_gray(rgba_image: &image::RgbaImage) -> Result<Mat> {
    opencv_match::convert::mat_to_grayscale(&rgba_to_mat(rgba_image)?, true)
        .context("Failed to convert image to grayscale")
}

/// Convert an OpenCV Mat back to an RGBA image.
pub fn mat_to_rgba(mat: &Mat) -> Result<image::RgbaImage> {
    mat.try_into_cv()
        .context("Failed to convert OpenCV Mat to RGBA image")
}
