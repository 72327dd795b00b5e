use std::time::{Duration, Instant};

use log::{debug, log_enabled, warn, Level};

use crate::config::PotentialConfig;
use crate::error::{PotentialError, Result};
use crate::particles::Particles;
use crate::real::Real;

/// Marker for a missing child, parent, `next` or `sibling` link.
pub const NONE: usize = usize::MAX;

#[inline]
pub(crate) fn start_timer() -> Option<Instant> {
    if log_enabled!(Level::Debug) {
        Some(Instant::now())
    } else {
        None
    }
}

#[inline]
pub(crate) fn log_timing(label: &str, t0: Option<Instant>) {
    if let Some(t0) = t0 {
        let dt: Duration = t0.elapsed();
        debug!("{label}: {:.3} ms", dt.as_secs_f64() * 1e3);
    }
}

/// Octant of `p` relative to `center`: bit j is set when coordinate j lies
/// strictly above the centre.
#[inline]
fn octant<F: Real>(p: &[F; 3], center: &[F; 3]) -> usize {
    let mut oct = 0usize;
    if p[0] > center[0] {
        oct |= 1;
    }
    if p[1] > center[1] {
        oct |= 2;
    }
    if p[2] > center[2] {
        oct |= 4;
    }
    oct
}

#[derive(Clone, Debug)]
pub struct Node<F: Real = f32> {
    pub center: [F; 3],
    /// Side length of the cube.
    pub len: F,
    pub mass: F,
    /// Mass-weighted offset from `center` while the tree is being built;
    /// absolute centre of mass once it is finalized.
    pub s: [F; 3],
    /// Squared opening distance. Only meaningful for internal nodes.
    pub oc: F,
    particle: Option<usize>,
    pub children: [usize; 8],
    pub parent: usize,
    /// Preorder successor, followed to open a cell.
    pub next: usize,
    /// Node to continue with once this subtree is done.
    pub sibling: usize,
}

impl<F: Real> Node<F> {
    fn empty(center: [F; 3], len: F, parent: usize) -> Self {
        Node {
            center,
            len,
            mass: F::zero(),
            s: [F::zero(); 3],
            oc: F::zero(),
            particle: None,
            children: [NONE; 8],
            parent,
            next: NONE,
            sibling: NONE,
        }
    }

    /// A leaf for `particle` in octant `oct` of the cube (`center`, `len`).
    fn leaf(
        particle: usize,
        pos: &[F; 3],
        mass: F,
        parent_idx: usize,
        parent_center: &[F; 3],
        parent_len: F,
        oct: usize,
    ) -> Self {
        let half = F::lit(0.5);
        let len = parent_len * half;
        let offset = len * half;
        let mut center = *parent_center;
        for (j, c) in center.iter_mut().enumerate() {
            if oct & (1 << j) != 0 {
                *c = *c + offset;
            } else {
                *c = *c - offset;
            }
        }
        let mut node = Node::empty(center, len, parent_idx);
        node.particle = Some(particle);
        node.add_particle(pos, mass);
        node
    }

    #[inline]
    fn add_particle(&mut self, pos: &[F; 3], mass: F) {
        for j in 0..3 {
            self.s[j] = self.s[j] + mass * (pos[j] - self.center[j]);
        }
        self.mass = self.mass + mass;
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.particle.is_some()
    }

    /// The particle held by a leaf.
    #[inline]
    pub fn particle(&self) -> Option<usize> {
        self.particle
    }

    /// Centre of mass, valid after finalization.
    #[inline]
    pub fn com(&self) -> [F; 3] {
        self.s
    }

    pub fn child_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.children.iter().copied().filter(|&c| c != NONE)
    }
}

/// Barnes-Hut octree holding one particle per leaf.
///
/// Nodes live in a pool sized up front and are addressed by index; the
/// parent, child, `next` and `sibling` relations are plain indices with
/// [`NONE`] as the null link. Node 0 is the root.
#[derive(Clone, Debug)]
pub struct Octree<F: Real = f32> {
    positions: Vec<[F; 3]>,
    masses: Vec<F>,
    nodes: Vec<Node<F>>,
    capacity: usize,
    opening_angle: F,
}

impl<F: Real> Octree<F> {
    /// Build and finalize a tree with the pool size and opening angle of `config`.
    pub fn build(particles: &Particles<'_, F>, config: &PotentialConfig) -> Result<Self> {
        config.validate()?;
        Octree::from_owned(
            particles.positions(),
            particles.masses().to_vec(),
            config.node_pool_capacity(particles.len()),
            F::lit(config.opening_angle),
        )
    }

    /// Build and finalize a tree from owned buffers with an explicit node
    /// pool capacity. Particles are inserted in input order.
    pub fn from_owned(
        positions: Vec<[F; 3]>,
        masses: Vec<F>,
        capacity: usize,
        opening_angle: F,
    ) -> Result<Self> {
        let n = positions.len();
        if masses.len() != n {
            return Err(PotentialError::InvalidInput(format!(
                "{} masses for {} positions",
                masses.len(),
                n
            )));
        }
        if n == 0 {
            return Err(PotentialError::InvalidInput(
                "cannot build a tree without particles".into(),
            ));
        }
        if !(opening_angle > F::zero()) {
            return Err(PotentialError::InvalidParameter(format!(
                "opening angle must be positive, got {opening_angle:?}"
            )));
        }

        let t_all = start_timer();

        let (center, len) = bounding_cube(&positions);
        if !(len > F::zero()) {
            return Err(PotentialError::DegenerateGeometry {
                extent: len.to_f64().unwrap_or(f64::NAN),
            });
        }

        let mut tree = Octree {
            positions,
            masses,
            nodes: Vec::with_capacity(capacity.min(n.saturating_mul(4))),
            capacity,
            opening_angle,
        };

        let t0 = start_timer();
        let mut root = Node::empty(center, len, NONE);
        root.particle = Some(0);
        root.add_particle(&tree.positions[0], tree.masses[0]);
        tree.alloc(root, 0)?;
        for i in 1..n {
            tree.insert(i)?;
        }
        log_timing("octree.insert", t0);

        let t0 = start_timer();
        tree.finalize();
        log_timing("octree.finalize", t0);

        debug!(
            "octree: {} nodes for {} particles (pool capacity {})",
            tree.nodes.len(),
            n,
            capacity
        );
        log_timing("octree.build.total", t_all);
        Ok(tree)
    }

    fn alloc(&mut self, node: Node<F>, inserting: usize) -> Result<usize> {
        if self.nodes.len() >= self.capacity {
            warn!(
                "maximum number {} of tree nodes reached, i={}, npart={}",
                self.capacity,
                inserting,
                self.positions.len()
            );
            return Err(PotentialError::CapacityExceeded {
                capacity: self.capacity,
                inserted: inserting,
                total: self.positions.len(),
            });
        }
        let idx = self.nodes.len();
        self.nodes.push(node);
        Ok(idx)
    }

    fn insert(&mut self, i: usize) -> Result<()> {
        let pos = self.positions[i];
        let mass = self.masses[i];

        // Descend, accumulating the particle into every node on the way,
        // until we hit an occupied leaf or an empty child slot.
        let mut th = 0usize;
        loop {
            let node = &mut self.nodes[th];
            node.add_particle(&pos, mass);
            if node.is_leaf() {
                break;
            }
            let child = node.children[octant(&pos, &node.center)];
            if child == NONE {
                break;
            }
            th = child;
        }

        // Split occupied leaves until the two particles separate.
        while let Some(p) = self.nodes[th].particle {
            let ppos = self.positions[p];
            let center = self.nodes[th].center;
            let len = self.nodes[th].len;
            let subp = octant(&ppos, &center);
            let moved = Node::leaf(p, &ppos, self.masses[p], th, &center, len, subp);
            let child = self.alloc(moved, i)?;

            let node = &mut self.nodes[th];
            node.particle = None;
            node.children[subp] = child;

            if octant(&pos, &center) != subp {
                break;
            }
            th = child;
            self.nodes[th].add_particle(&pos, mass);
        }

        let center = self.nodes[th].center;
        let len = self.nodes[th].len;
        let subi = octant(&pos, &center);
        let leaf = self.alloc(Node::leaf(i, &pos, mass, th, &center, len, subi), i)?;
        self.nodes[th].children[subi] = leaf;
        Ok(())
    }

    /// Turn accumulated offsets into centres of mass, set opening
    /// thresholds and wire up the stack-free walk.
    fn finalize(&mut self) {
        let theta = self.opening_angle;
        for idx in 0..self.nodes.len() {
            let children = {
                let node = &mut self.nodes[idx];
                let inv_m = F::one() / node.mass;
                for j in 0..3 {
                    node.s[j] = node.s[j] * inv_m;
                }
                if !node.is_leaf() {
                    let d = (node.s[0] * node.s[0] + node.s[1] * node.s[1] + node.s[2] * node.s[2])
                        .sqrt();
                    let oc = d + node.len / theta;
                    node.oc = oc * oc;
                }
                for j in 0..3 {
                    node.s[j] = node.s[j] + node.center[j];
                }
                node.children
            };

            let mut nn = NONE;
            for &c in children.iter().rev() {
                if c != NONE {
                    self.nodes[c].sibling = nn;
                    nn = c;
                }
            }
        }
        self.build_treewalk_links();
    }

    fn build_treewalk_links(&mut self) {
        // Preorder `next` chain, children visited in octant order.
        let mut last = NONE;
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            if last != NONE {
                self.nodes[last].next = idx;
            }
            last = idx;
            for &c in self.nodes[idx].children.iter().rev() {
                if c != NONE {
                    stack.push(c);
                }
            }
        }
        if last != NONE {
            self.nodes[last].next = NONE;
        }

        // Last children continue with the nearest ancestor's sibling.
        // Parents are always allocated before their children, so every
        // ancestor is already patched when we get here.
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].sibling != NONE {
                continue;
            }
            let mut ff = idx;
            let mut nn = NONE;
            while nn == NONE {
                ff = self.nodes[ff].parent;
                if ff == NONE {
                    break;
                }
                nn = self.nodes[ff].sibling;
            }
            self.nodes[idx].sibling = nn;
        }
    }

    pub fn nodes(&self) -> &[Node<F>] {
        &self.nodes
    }

    pub fn root(&self) -> &Node<F> {
        &self.nodes[0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[F; 3]] {
        &self.positions
    }

    pub fn masses(&self) -> &[F] {
        &self.masses
    }

    pub fn opening_angle(&self) -> F {
        self.opening_angle
    }

    pub fn total_mass(&self) -> F {
        self.root().mass
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for idx in 1..self.nodes.len() {
            depth[idx] = depth[self.nodes[idx].parent] + 1;
            max = max.max(depth[idx]);
        }
        max
    }
}

/// Cube enclosing all points: centre of the bounding box and the largest
/// axis extent inflated by 1%.
fn bounding_cube<F: Real>(pts: &[[F; 3]]) -> ([F; 3], F) {
    let mut minp = [F::infinity(); 3];
    let mut maxp = [F::neg_infinity(); 3];
    for p in pts {
        for i in 0..3 {
            if p[i] < minp[i] {
                minp[i] = p[i];
            }
            if p[i] > maxp[i] {
                maxp[i] = p[i];
            }
        }
    }
    let two = F::lit(2.0);
    let center = [
        (minp[0] + maxp[0]) / two,
        (minp[1] + maxp[1]) / two,
        (minp[2] + maxp[2]) / two,
    ];
    let mut len = F::zero();
    for i in 0..3 {
        len = len.max(maxp[i] - minp[i]);
    }
    (center, len * F::lit(1.01))
}
