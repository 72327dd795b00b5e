use log::{debug, info};

use crate::config::{Method, PotentialConfig, SmallSystemPolicy};
use crate::direct;
use crate::error::{PotentialError, Result};
use crate::kernel::{KernelKind, KernelTable, Softening};
use crate::particles::Particles;
use crate::real::Real;
use crate::tree::{log_timing, start_timer, Octree};
use crate::units;
use crate::walk::PotentialEvaluator;

/// What the dispatcher will do for a given particle count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plan {
    Tree,
    Exact,
    /// Leave the output at zero.
    Skip,
}

/// Chooses between the octree and the exact sum and converts the result
/// to physical units.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    config: PotentialConfig,
}

impl Dispatcher {
    pub fn new(config: PotentialConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PotentialConfig {
        &self.config
    }

    pub fn plan(&self, n: usize) -> Plan {
        match self.config.method {
            Method::Tree => Plan::Tree,
            Method::Exact => Plan::Exact,
            Method::Auto if n > self.config.tree_threshold => Plan::Tree,
            Method::Auto => match self.config.small_system {
                SmallSystemPolicy::Skip => Plan::Skip,
                SmallSystemPolicy::Exact => Plan::Exact,
            },
        }
    }

    pub fn compute<F: Real>(&self, particles: &Particles<'_, F>) -> Result<Vec<F>> {
        let mut out = vec![F::zero(); particles.len()];
        self.compute_into(particles, &mut out)?;
        Ok(out)
    }

    /// Fill `out` with the potential of every particle. On error the
    /// contents of `out` are unspecified.
    pub fn compute_into<F: Real>(&self, particles: &Particles<'_, F>, out: &mut [F]) -> Result<()> {
        let n = particles.len();
        if out.len() != n {
            return Err(PotentialError::InvalidInput(format!(
                "output buffer has length {}, expected {}",
                out.len(),
                n
            )));
        }
        out.fill(F::zero());
        if n == 0 {
            return Ok(());
        }

        let plan = self.plan(n);
        debug!("potential of {n} particles: {plan:?}");
        let t_all = start_timer();
        let h = F::lit(self.config.softening_length());

        match plan {
            Plan::Skip => {
                info!(
                    "{n} particles is not above the tree threshold {}, potentials left at zero",
                    self.config.tree_threshold
                );
                return Ok(());
            }
            Plan::Tree => {
                let table = KernelTable::build(self.config.kernel_length);
                let tree = Octree::build(particles, &self.config)?;
                PotentialEvaluator::new(&tree, Softening::new(&table, h)).potentials(out)?;
            }
            Plan::Exact => {
                let pot = match self.config.exact_kernel {
                    KernelKind::CubicSpline => {
                        let table = KernelTable::build(self.config.kernel_length);
                        direct::direct_potentials(particles, Softening::new(&table, h))
                    }
                    KernelKind::Plummer => direct::direct_potentials_plummer(
                        particles,
                        F::lit(self.config.softening_scale),
                    ),
                };
                out.copy_from_slice(&pot);
            }
        }

        units::to_physical(out, self.config.gravitational_constant);
        if plan == Plan::Tree {
            debug_assert!(out.iter().all(|&p| p < F::zero()));
        }
        log_timing("dispatch.compute_into.total", t_all);
        Ok(())
    }
}

/// Entry point for callers holding raw single-precision buffers: `mass`,
/// `x`, `y`, `z` and `out` must all have the same length. Uses the default
/// configuration.
pub fn calculate_potential(
    mass: &[f32],
    x: &[f32],
    y: &[f32],
    z: &[f32],
    out: &mut [f32],
) -> Result<()> {
    let particles = Particles::new(mass, x, y, z)?;
    Dispatcher::default().compute_into(&particles, out)
}
