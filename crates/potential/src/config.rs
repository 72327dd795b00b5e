use serde::Deserialize;
use serde::Serialize;

use crate::error::{PotentialError, Result};
use crate::kernel::KernelKind;
use crate::units::G_CODE;

/// How the dispatcher chooses between the tree and the exact sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Tree above `tree_threshold` particles, `small_system` policy otherwise.
    #[default]
    Auto,
    /// Always build the octree.
    Tree,
    /// Always use the O(N^2) pairwise sum.
    Exact,
}

/// What `Method::Auto` does with systems of at most `tree_threshold` particles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmallSystemPolicy {
    /// Leave the output buffer zeroed.
    #[default]
    Skip,
    /// Fall back to the exact pairwise sum.
    Exact,
}

/// Parameters for the potential calculation. The defaults are the usual
/// fixed constants: theta 0.45, a 3 kpc softening scale and a 10000-entry
/// kernel table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PotentialConfig {
    /// Opening-angle tolerance of the tree walk. A cell is opened when the
    /// query point is closer than `|com - center| + side / opening_angle`.
    /// Smaller values open more cells: slower, more accurate.
    pub opening_angle: f64,
    /// Softening scale in kpc. The softening length used by the kernel is
    /// `softening_factor * softening_scale`.
    pub softening_scale: f64,
    /// Ratio between the spline softening length and the softening scale.
    pub softening_factor: f64,
    /// Number of intervals in the tabulated softening kernel.
    pub kernel_length: usize,
    /// The node pool holds `node_pool_factor * N + node_pool_slack` nodes.
    pub node_pool_factor: usize,
    pub node_pool_slack: usize,
    /// Systems with more particles than this go through the tree under
    /// `Method::Auto`.
    pub tree_threshold: usize,
    pub method: Method,
    pub small_system: SmallSystemPolicy,
    /// Softening used by the exact pairwise sum.
    pub exact_kernel: KernelKind,
    /// Factor applied to code-unit potentials, (km/s)^2 kpc / M_sun by default.
    pub gravitational_constant: f64,
}

impl Default for PotentialConfig {
    fn default() -> Self {
        Self {
            opening_angle: 0.45,
            softening_scale: 3.0,
            softening_factor: 2.8,
            kernel_length: 10_000,
            node_pool_factor: 2,
            node_pool_slack: 200,
            tree_threshold: 1000,
            method: Method::Auto,
            small_system: SmallSystemPolicy::Skip,
            exact_kernel: KernelKind::CubicSpline,
            gravitational_constant: G_CODE,
        }
    }
}

impl PotentialConfig {
    pub fn softening_length(&self) -> f64 {
        self.softening_factor * self.softening_scale
    }

    /// A-priori size of the node pool for `n` particles. This is a
    /// heuristic; strongly clustered inputs can need more.
    pub fn node_pool_capacity(&self, n: usize) -> usize {
        self.node_pool_factor
            .saturating_mul(n)
            .saturating_add(self.node_pool_slack)
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, v: f64) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PotentialError::InvalidParameter(format!(
                    "{name} must be positive and finite, got {v}"
                )))
            }
        }
        positive("opening_angle", self.opening_angle)?;
        positive("softening_scale", self.softening_scale)?;
        positive("softening_factor", self.softening_factor)?;
        positive("gravitational_constant", self.gravitational_constant)?;
        if self.kernel_length < 2 {
            return Err(PotentialError::InvalidParameter(format!(
                "kernel_length must be at least 2, got {}",
                self.kernel_length
            )));
        }
        if self.node_pool_factor == 0 {
            return Err(PotentialError::InvalidParameter(
                "node_pool_factor must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
