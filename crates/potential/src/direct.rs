use rayon::prelude::*;

use crate::kernel::{plummer_potential, Softening};
use crate::particles::Particles;
use crate::real::Real;

/// Below this many targets the sums run serially.
const PARALLEL_THRESHOLD: usize = 512;

/// O(N^2) direct-sum potential with the same softening rule the tree walk
/// applies to single particles. Every source contributes, the particle
/// itself included (its softened self term is finite), so the result is
/// what the tree approximates.
pub fn direct_potentials<F: Real>(particles: &Particles<'_, F>, softening: Softening<'_, F>) -> Vec<F> {
    let n = particles.len();
    let mut pot = vec![F::zero(); n];
    if n == 0 {
        return pot;
    }
    if n < PARALLEL_THRESHOLD {
        // pair-wise loop, compute each interaction once and update both particles
        for i in 0..n {
            let pi = particles.position(i);
            let mi = particles.mass(i);
            pot[i] = pot[i] + softening.potential(mi, F::zero());
            for j in (i + 1)..n {
                let pj = particles.position(j);
                let r = distance(&pi, &pj);
                let mj = particles.mass(j);
                pot[i] = pot[i] + softening.potential(mj, r);
                pot[j] = pot[j] + softening.potential(mi, r);
            }
        }
    } else {
        pot.par_iter_mut().enumerate().for_each(|(i, pot_i)| {
            let pi = particles.position(i);
            let mut phi = F::zero();
            for j in 0..n {
                let r = distance(&pi, &particles.position(j));
                phi = phi + softening.potential(particles.mass(j), r);
            }
            *pot_i = phi;
        });
    }
    pot
}

/// Direct-sum potential at arbitrary points.
pub fn direct_potentials_at_points<F: Real>(
    particles: &Particles<'_, F>,
    softening: Softening<'_, F>,
    targets: &[[F; 3]],
) -> Vec<F> {
    let n_src = particles.len();
    let sum_at = |t: &[F; 3]| {
        let mut phi = F::zero();
        for j in 0..n_src {
            let r = distance(t, &particles.position(j));
            phi = phi + softening.potential(particles.mass(j), r);
        }
        phi
    };
    if targets.len() < PARALLEL_THRESHOLD {
        targets.iter().map(sum_at).collect()
    } else {
        targets.par_iter().map(sum_at).collect()
    }
}

/// Plummer-softened direct sum, `-sum_j m_j / sqrt(r_ij^2 + eps^2)` over
/// all `j != i`.
pub fn direct_potentials_plummer<F: Real>(particles: &Particles<'_, F>, eps: F) -> Vec<F> {
    let n = particles.len();
    let eps2 = eps * eps;
    let sum_for = |i: usize| {
        let pi = particles.position(i);
        let mut phi = F::zero();
        for j in 0..n {
            if j == i {
                continue;
            }
            let r2 = distance2(&pi, &particles.position(j));
            phi = phi + plummer_potential(particles.mass(j), r2, eps2);
        }
        phi
    };
    if n < PARALLEL_THRESHOLD {
        (0..n).map(sum_for).collect()
    } else {
        (0..n).into_par_iter().map(sum_for).collect()
    }
}

#[inline]
fn distance2<F: Real>(a: &[F; 3], b: &[F; 3]) -> F {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    dx * dx + dy * dy + dz * dz
}

#[inline]
fn distance<F: Real>(a: &[F; 3], b: &[F; 3]) -> F {
    distance2(a, b).sqrt()
}
