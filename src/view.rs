// src/view.rs
//
// Image-to-pitch projection. The camera is fixed, so a single planar
// homography solved from four configured corner correspondences maps
// camera-compensated image points onto real-world pitch coordinates.

use crate::types::{PitchConfig, Point};
use anyhow::{bail, Result};
use nalgebra::{Matrix3, SMatrix, SVector};

/// Projection into pitch coordinates. Returns `None` when the point lies
/// outside the known playing-surface region; that is missing data, not an
/// error.
pub trait ViewTransform {
    fn transform(&self, point: &Point) -> Option<Point>;
}

pub struct HomographyTransform {
    matrix: Matrix3<f64>,
    /// Image-space quadrilateral covering the visible playing surface.
    valid_region: [Point; 4],
    /// Pitch-space bounds the projection must land in: x in [0, length],
    /// y in [0, width].
    pitch_length: f64,
    pitch_width: f64,
}

impl HomographyTransform {
    pub fn from_config(pitch: &PitchConfig) -> Result<Self> {
        let src: Vec<Point> = pitch
            .image_corners
            .iter()
            .map(|c| Point::new(c[0], c[1]))
            .collect();
        let dst: Vec<Point> = pitch
            .pitch_corners
            .iter()
            .map(|c| Point::new(c[0], c[1]))
            .collect();

        let matrix = solve_homography(&src, &dst)?;
        Ok(Self {
            matrix,
            valid_region: [src[0], src[1], src[2], src[3]],
            pitch_length: pitch.pitch_length,
            pitch_width: pitch.pitch_width,
        })
    }

    fn contains(&self, p: &Point) -> bool {
        // Ray casting against the corner quadrilateral.
        let mut inside = false;
        let n = self.valid_region.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = &self.valid_region[i];
            let b = &self.valid_region[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

impl ViewTransform for HomographyTransform {
    fn transform(&self, point: &Point) -> Option<Point> {
        if !self.contains(point) {
            return None;
        }

        let h = &self.matrix;
        let w = h[(2, 0)] * point.x + h[(2, 1)] * point.y + h[(2, 2)];
        if w.abs() < 1e-12 {
            return None;
        }
        let u = (h[(0, 0)] * point.x + h[(0, 1)] * point.y + h[(0, 2)]) / w;
        let v = (h[(1, 0)] * point.x + h[(1, 1)] * point.y + h[(1, 2)]) / w;

        const EPS: f64 = 1e-6;
        if u < -EPS || u > self.pitch_length + EPS || v < -EPS || v > self.pitch_width + EPS {
            return None;
        }
        Some(Point::new(u, v))
    }
}

/// Direct linear solve for the 8 unknowns of a planar homography with
/// h33 fixed to 1, from exactly four point correspondences.
fn solve_homography(src: &[Point], dst: &[Point]) -> Result<Matrix3<f64>> {
    assert_eq!(src.len(), 4);
    assert_eq!(dst.len(), 4);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let r = i * 2;
        a[(r, 0)] = s.x;
        a[(r, 1)] = s.y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -d.x * s.x;
        a[(r, 7)] = -d.x * s.y;
        b[r] = d.x;

        a[(r + 1, 3)] = s.x;
        a[(r + 1, 4)] = s.y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -d.y * s.x;
        a[(r + 1, 7)] = -d.y * s.y;
        b[r + 1] = d.y;
    }

    let Some(h) = a.lu().solve(&b) else {
        bail!("Degenerate corner configuration: homography system is singular");
    };

    Ok(Matrix3::new(
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0,
    ))
}
