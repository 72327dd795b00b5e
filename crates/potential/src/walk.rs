use rayon::prelude::*;

use crate::error::{PotentialError, Result};
use crate::kernel::Softening;
use crate::real::Real;
use crate::tree::{log_timing, start_timer, Octree, NONE};

/// Below this many queries the walk runs serially.
const PARALLEL_THRESHOLD: usize = 1024;

/// Counters collected during a single walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Internal nodes that had to be opened.
    pub opened: usize,
    /// Internal nodes replaced by a point mass at their centre of mass.
    pub approximated: usize,
    /// Single-particle interactions.
    pub leaves: usize,
}

impl WalkStats {
    pub fn interactions(&self) -> usize {
        self.approximated + self.leaves
    }
}

/// Evaluates the potential of a finalized [`Octree`] at query points.
/// The tree is only read, so queries can run concurrently.
#[derive(Clone, Copy, Debug)]
pub struct PotentialEvaluator<'a, F: Real = f32> {
    tree: &'a Octree<F>,
    softening: Softening<'a, F>,
}

impl<'a, F: Real> PotentialEvaluator<'a, F> {
    pub fn new(tree: &'a Octree<F>, softening: Softening<'a, F>) -> Self {
        Self { tree, softening }
    }

    #[inline]
    pub fn potential_at(&self, pos: &[F; 3]) -> F {
        self.potential_with_stats(pos).0
    }

    /// Walk the tree for one query point. Leaves contribute their
    /// particle directly; an internal node is opened when the query lies
    /// inside its opening distance and is otherwise treated as a single
    /// softened point mass.
    pub fn potential_with_stats(&self, pos: &[F; 3]) -> (F, WalkStats) {
        let nodes = self.tree.nodes();
        let mut stats = WalkStats::default();
        let mut pot = F::zero();
        let mut idx = if nodes.is_empty() { NONE } else { 0 };

        while idx != NONE {
            let node = &nodes[idx];
            let dx = node.s[0] - pos[0];
            let dy = node.s[1] - pos[1];
            let dz = node.s[2] - pos[2];
            let r2 = dx * dx + dy * dy + dz * dz;

            if node.is_leaf() {
                pot = pot + self.softening.potential(node.mass, r2.sqrt());
                stats.leaves += 1;
                idx = node.sibling;
            } else if r2 < node.oc {
                stats.opened += 1;
                idx = node.next;
            } else {
                pot = pot + self.softening.potential(node.mass, r2.sqrt());
                stats.approximated += 1;
                idx = node.sibling;
            }
        }
        (pot, stats)
    }

    /// Potential at the position of every particle the tree was built from.
    pub fn potentials(&self, out: &mut [F]) -> Result<()> {
        let positions = self.tree.positions();
        if out.len() != positions.len() {
            return Err(PotentialError::InvalidInput(format!(
                "output buffer has length {}, expected {}",
                out.len(),
                positions.len()
            )));
        }
        self.potentials_at_points(positions, out)
    }

    pub fn potentials_at_points(&self, points: &[[F; 3]], out: &mut [F]) -> Result<()> {
        if out.len() != points.len() {
            return Err(PotentialError::InvalidInput(format!(
                "output buffer has length {}, expected {}",
                out.len(),
                points.len()
            )));
        }
        let t0 = start_timer();
        if points.len() < PARALLEL_THRESHOLD {
            out.iter_mut()
                .zip(points.iter())
                .for_each(|(out_i, p)| *out_i = self.potential_at(p));
        } else {
            out.par_iter_mut()
                .zip(points.par_iter())
                .for_each(|(out_i, p)| *out_i = self.potential_at(p));
        }
        log_timing("octree.potentials_at_points", t0);
        Ok(())
    }
}
