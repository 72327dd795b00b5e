//! Gravitational potential energy of point masses.
//!
//! Large systems go through a Barnes-Hut octree with one particle per
//! leaf and a tabulated spline softening kernel; small systems can use an
//! exact pairwise sum. See [`Dispatcher`] for the policy.

pub mod config;
pub mod direct;
pub mod dispatch;
pub mod error;
pub mod kernel;
pub mod particles;
pub mod real;
pub mod tree;
pub mod units;
pub mod walk;

pub use crate::config::{Method, PotentialConfig, SmallSystemPolicy};
pub use crate::dispatch::{calculate_potential, Dispatcher, Plan};
pub use crate::error::{PotentialError, Result};
pub use crate::kernel::{KernelKind, KernelTable, Softening};
pub use crate::particles::Particles;
pub use crate::real::Real;
pub use crate::tree::Octree;
pub use crate::walk::{PotentialEvaluator, WalkStats};
