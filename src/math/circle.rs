//! Algebraic circle fit for curved glyph candidates
//!
//! Uses the Kasa least-squares formulation: minimizing the algebraic distance
//! gives a 3x3 linear system solved by Cramer's rule. Accuracy is sufficient
//! to decide whether a glyph is plausibly an arc; it is not a geometric fit.

/// A fitted circle with its mean radial fitting error
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center abscissa
    pub center_x: f64,
    /// Center ordinate
    pub center_y: f64,
    /// Radius
    pub radius: f64,
    /// Mean absolute radial deviation of the sample points
    pub distance: f64,
}

impl Circle {
    /// Fit a circle through a point cloud
    ///
    /// Returns `None` when fewer than three points are given or when the
    /// points are (close to) collinear, since no finite circle exists then.
    pub fn fit(points: &[[i32; 2]]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let n = points.len() as f64;
        let (mut sx, mut sy) = (0.0f64, 0.0f64);
        let (mut sxx, mut sxy, mut syy) = (0.0f64, 0.0f64, 0.0f64);
        let (mut sxz, mut syz, mut sz) = (0.0f64, 0.0f64, 0.0f64);

        for &[xi, yi] in points {
            let x = f64::from(xi);
            let y = f64::from(yi);
            let z = x.mul_add(x, y * y);
            sx += x;
            sy += y;
            sxx += x * x;
            sxy += x * y;
            syy += y * y;
            sxz += x * z;
            syz += y * z;
            sz += z;
        }

        // Solve [sxx sxy sx; sxy syy sy; sx sy n] * [a b c] = [sxz syz sz]
        let det = sxx * syy.mul_add(n, -(sy * sy)) - sxy * sxy.mul_add(n, -(sy * sx))
            + sx * sxy.mul_add(sy, -(syy * sx));
        if det.abs() < 1e-9 {
            return None;
        }

        let det_a = sxz * syy.mul_add(n, -(sy * sy)) - sxy * syz.mul_add(n, -(sy * sz))
            + sx * syz.mul_add(sy, -(syy * sz));
        let det_b = sxx * syz.mul_add(n, -(sz * sy)) - sxz * sxy.mul_add(n, -(sy * sx))
            + sx * sxy.mul_add(sz, -(syz * sx));
        let det_c = sxx * syy.mul_add(sz, -(sy * syz)) - sxy * sxy.mul_add(sz, -(sx * syz))
            + sxz * sxy.mul_add(sy, -(syy * sx));

        let a = det_a / det;
        let b = det_b / det;
        let c = det_c / det;

        let center_x = a / 2.0;
        let center_y = b / 2.0;
        let radius_sq = center_x.mul_add(center_x, center_y * center_y) + c;
        if radius_sq <= 0.0 {
            return None;
        }
        let radius = radius_sq.sqrt();

        let mut deviation = 0.0;
        for &[xi, yi] in points {
            let dx = f64::from(xi) - center_x;
            let dy = f64::from(yi) - center_y;
            deviation += (dx.hypot(dy) - radius).abs();
        }

        Some(Self {
            center_x,
            center_y,
            radius,
            distance: deviation / n,
        })
    }
}
