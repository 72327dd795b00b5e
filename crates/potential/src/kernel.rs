use serde::Deserialize;
use serde::Serialize;

use crate::real::Real;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelKind {
    /// Springel-style cubic spline gravitational softening (W2 kernel), tabulated.
    /// phi(r;h) = (1/h) * W2(r/h), Newtonian -1/r for r >= h.
    #[default]
    CubicSpline,
    /// Plummer softening: phi = -1/sqrt(r^2 + eps^2).
    Plummer,
}

/// Analytic W2(u) of the spline kernel, in units where h = 1.
///
/// Both branches meet at u = 0.5, and the outer branch reaches -1 at
/// u = 1 where the Newtonian -1/u takes over.
#[inline]
pub fn spline_potential(u: f64) -> f64 {
    if u <= 0.5 {
        spline_inner(u)
    } else if u < 1.0 {
        spline_outer(u)
    } else {
        -1.0 / u
    }
}

/// 16/3 u^2 - 48/5 u^4 + 32/5 u^5 - 14/5
#[inline]
pub fn spline_inner(u: f64) -> f64 {
    let u2 = u * u;
    let u4 = u2 * u2;
    let u5 = u4 * u;
    (16.0 / 3.0) * u2 - (48.0 / 5.0) * u4 + (32.0 / 5.0) * u5 - 14.0 / 5.0
}

/// 1/(15u) + 32/3 u^2 - 16 u^3 + 48/5 u^4 - 32/15 u^5 - 16/5
#[inline]
pub fn spline_outer(u: f64) -> f64 {
    let inv_u = 1.0 / u;
    let u2 = u * u;
    let u3 = u2 * u;
    let u4 = u2 * u2;
    let u5 = u4 * u;
    (1.0 / 15.0) * inv_u + (32.0 / 3.0) * u2 - 16.0 * u3 + (48.0 / 5.0) * u4
        - (32.0 / 15.0) * u5
        - 16.0 / 5.0
}

/// The spline kernel sampled at `length + 1` equally spaced radii in [0, 1].
#[derive(Clone, Debug)]
pub struct KernelTable<F: Real = f32> {
    radius: Vec<F>,
    potential: Vec<F>,
    scale: F,
}

impl<F: Real> KernelTable<F> {
    /// Tabulate the kernel with `length` intervals.
    pub fn build(length: usize) -> Self {
        let length = length.max(1);
        let scale = F::lit(length as f64);
        let mut radius = Vec::with_capacity(length + 1);
        let mut potential = Vec::with_capacity(length + 1);
        for i in 0..=length {
            let u = i as f64 / length as f64;
            radius.push(F::lit(u));
            let w = if u <= 0.5 {
                spline_inner(u)
            } else {
                spline_outer(u)
            };
            potential.push(F::lit(w));
        }
        Self {
            radius,
            potential,
            scale,
        }
    }

    /// Number of intervals K. The table holds K + 1 samples.
    pub fn len(&self) -> usize {
        self.radius.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn radius(&self) -> &[F] {
        &self.radius
    }

    pub fn potential(&self) -> &[F] {
        &self.potential
    }

    /// Linear interpolation of W2 at `u`, valid for 0 <= u < 1.
    #[inline]
    pub fn lookup(&self, u: F) -> F {
        let ff = u * self.scale;
        // u*K can round up to K just below u = 1.
        let ii = ff.floor_index().min(self.radius.len() - 2);
        let frac = ff - self.radius[ii] * self.scale;
        let p0 = self.potential[ii];
        let p1 = self.potential[ii + 1];
        p0 + (p1 - p0) * frac
    }
}

/// A kernel table together with the softening length it is applied at.
#[derive(Clone, Copy, Debug)]
pub struct Softening<'a, F: Real = f32> {
    table: &'a KernelTable<F>,
    h: F,
    h_inv: F,
}

impl<'a, F: Real> Softening<'a, F> {
    pub fn new(table: &'a KernelTable<F>, h: F) -> Self {
        Self {
            table,
            h,
            h_inv: F::one() / h,
        }
    }

    #[inline]
    pub fn length(&self) -> F {
        self.h
    }

    pub fn table(&self) -> &'a KernelTable<F> {
        self.table
    }

    /// Potential of a point mass `mass` seen at distance `r`. Newtonian
    /// outside the softening length, tabulated spline inside.
    #[inline]
    pub fn potential(&self, mass: F, r: F) -> F {
        let u = r * self.h_inv;
        if u >= F::one() {
            -mass / r
        } else {
            mass * self.h_inv * self.table.lookup(u)
        }
    }
}

/// Plummer-softened potential of a point mass at squared distance `r2`.
#[inline]
pub fn plummer_potential<F: Real>(mass: F, r2: F, eps2: F) -> F {
    -mass / (r2 + eps2).sqrt()
}
