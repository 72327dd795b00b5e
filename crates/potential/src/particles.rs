use crate::error::{PotentialError, Result};
use crate::real::Real;

/// Borrowed view of a particle set: one mass buffer and three coordinate
/// buffers, all of the same length and indexed consistently.
#[derive(Clone, Copy, Debug)]
pub struct Particles<'a, F: Real = f32> {
    mass: &'a [F],
    x: &'a [F],
    y: &'a [F],
    z: &'a [F],
}

impl<'a, F: Real> Particles<'a, F> {
    /// Validates buffer lengths, finite coordinates and positive masses.
    pub fn new(mass: &'a [F], x: &'a [F], y: &'a [F], z: &'a [F]) -> Result<Self> {
        let n = mass.len();
        if x.len() != n || y.len() != n || z.len() != n {
            return Err(PotentialError::InvalidInput(format!(
                "buffer lengths differ: mass={} x={} y={} z={}",
                n,
                x.len(),
                y.len(),
                z.len()
            )));
        }
        if let Some(i) = mass.iter().position(|&m| !(m.is_finite() && m > F::zero())) {
            return Err(PotentialError::InvalidInput(format!(
                "mass of particle {i} must be positive and finite, got {:?}",
                mass[i]
            )));
        }
        for (axis, buf) in [("x", x), ("y", y), ("z", z)] {
            if let Some(i) = buf.iter().position(|c| !c.is_finite()) {
                return Err(PotentialError::InvalidInput(format!(
                    "{axis} coordinate of particle {i} is not finite"
                )));
            }
        }
        Ok(Self { mass, x, y, z })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    #[inline]
    pub fn position(&self, i: usize) -> [F; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    #[inline]
    pub fn mass(&self, i: usize) -> F {
        self.mass[i]
    }

    pub fn masses(&self) -> &'a [F] {
        self.mass
    }

    pub fn total_mass(&self) -> F {
        self.mass.iter().copied().sum()
    }

    /// Interleaved copy of the coordinates.
    pub fn positions(&self) -> Vec<[F; 3]> {
        (0..self.len()).map(|i| self.position(i)).collect()
    }
}
