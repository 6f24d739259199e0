//! Template matching against captured frames using OpenCV
//!
//! The matcher is a thin wrapper over `match_template`: normalized
//! cross-correlation, a caller-supplied similarity threshold, overlap
//! suppression so one on-screen element yields one match, and a hard cap
//! on the number of reported hits.

use anyhow::Context;
use image::RgbaImage;
use opencv::{
    core::{self, CV_64F, Mat},
    imgproc,
    prelude::*,
};
use serde::{Deserialize, Serialize};

use stagebot_core::{Match, Rect};

use crate::Result;
use crate::convert;

/// Matcher tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Suppress a hit whose IoU with an already-kept hit exceeds this.
    pub overlap_threshold: f64,
    /// Upper bound on reported matches per query.
    pub max_matches: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.2,
            max_matches: 18,
        }
    }
}

/// OpenCV-backed template matcher.
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Find every occurrence of `target` within `base` with confidence at
    /// least `similarity`, best first.
    ///
    /// Never fails on "nothing found": an empty Vec is the answer. The
    /// query degenerates to empty when the template does not fit inside
    /// the frame.
    pub fn find_all(
        &self,
        target: &RgbaImage,
        base: &RgbaImage,
        similarity: f64,
    ) -> Result<Vec<Match>> {
        if target.width() == 0
            || target.height() == 0
            || target.width() > base.width()
            || target.height() > base.height()
        {
            return Ok(Vec::new());
        }

        let base_mat = convert::rgba_to_gray(base)?;
        let target_mat = convert::rgba_to_gray(target)?;

        let mut response = Mat::default();
        imgproc::match_template(
            &base_mat,
            &target_mat,
            &mut response,
            imgproc::TM_CCOEFF_NORMED,
            &core::no_array(),
        )
        .context("Template matching failed")?;

        let mut response_f64 = Mat::default();
        response.convert_to(&mut response_f64, CV_64F, 1.0, 0.0)?;

        let width = target.width() as i32;
        let height = target.height() as i32;

        let mut matches = Vec::new();
        for y in 0..response_f64.rows() {
            for x in 0..response_f64.cols() {
                let confidence: f64 = *response_f64.at_2d(y, x)?;
                if confidence >= similarity {
                    matches.push(Match::new(Rect::new(x, y, width, height), confidence));
                }
            }
        }

        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut kept: Vec<Match> = Vec::new();
        for candidate in matches {
            if kept.len() >= self.config.max_matches {
                break;
            }
            if kept
                .iter()
                .all(|m| !m.rect.overlaps(&candidate.rect, self.config.overlap_threshold))
            {
                kept.push(candidate);
            }
        }

        Ok(kept)
    }

    /// Whether `target` occurs in `base` at all.
    pub fn has(&self, target: &RgbaImage, base: &RgbaImage, similarity: f64) -> Result<bool> {
        Ok(!self.find_all(target, base, similarity)?.is_empty())
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic high-variance texture; different seeds are unrelated.
    fn textured(width: u32, height: u32, seed: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x
                .wrapping_mul(31)
                .wrapping_add(y.wrapping_mul(57))
                .wrapping_add(seed)
                .wrapping_mul(2654435761)
                >> 16) as u8;
            image::Rgba([v, v, v, 255])
        })
    }

    fn base_with_patch() -> (RgbaImage, RgbaImage) {
        let base = textured(120, 120, 7);
        let patch = image::imageops::crop_imm(&base, 30, 40, 20, 20).to_image();
        (base, patch)
    }

    #[test]
    fn test_exact_patch_is_found_where_it_lives() -> Result<()> {
        let (base, patch) = base_with_patch();
        let matcher = Matcher::default();

        let matches = matcher.find_all(&patch, &base, 0.9)?;
        assert!(!matches.is_empty());
        assert_eq!(matches[0].rect.x, 30);
        assert_eq!(matches[0].rect.y, 40);
        assert!(matches[0].confidence > 0.99);
        Ok(())
    }

    #[test]
    fn test_threshold_monotonicity() -> Result<()> {
        let (base, patch) = base_with_patch();
        let matcher = Matcher::default();

        let mut previous = 0;
        for similarity in [0.99, 0.5, 0.1] {
            let matches = matcher.find_all(&patch, &base, similarity)?;
            assert!(matches.iter().all(|m| m.confidence >= similarity));
            assert!(matches.len() >= previous);
            previous = matches.len();
        }
        Ok(())
    }

    #[test]
    fn test_absent_template_yields_empty() -> Result<()> {
        let base = textured(120, 120, 7);
        let stranger = textured(20, 20, 99);
        let matcher = Matcher::default();

        assert!(matcher.find_all(&stranger, &base, 0.9)?.is_empty());
        assert!(!matcher.has(&stranger, &base, 0.9)?);
        Ok(())
    }

    #[test]
    fn test_oversized_template_yields_empty() -> Result<()> {
        let base = textured(40, 40, 7);
        let huge = textured(60, 60, 7);
        let matcher = Matcher::default();

        assert!(matcher.find_all(&huge, &base, 0.5)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_two_occurrences_yield_two_matches() -> Result<()> {
        let mut base = textured(120, 120, 7);
        let patch = textured(16, 16, 21);
        image::imageops::overlay(&mut base, &patch, 10, 50);
        image::imageops::overlay(&mut base, &patch, 80, 50);

        let matcher = Matcher::default();
        let matches = matcher.find_all(&patch, &base, 0.95)?;

        assert_eq!(matches.len(), 2);
        let mut xs: Vec<i32> = matches.iter().map(|m| m.rect.x).collect();
        xs.sort();
        assert_eq!(xs, vec![10, 80]);
        Ok(())
    }
}
