// SPDX-License-Identifier: GPL-3.0-only

//! Region growing (flood fill) over a depth grid
//!
//! Breadth-first traversal from a seed. A neighbor joins the region when its
//! depth is reliable and differs from the current member's depth by less than
//! the tolerance. Neighbors that fail the test are marked as the region
//! boundary and the traversal does not continue through them.
//!
//! Membership is the 4-connected component of the seed under that edge test,
//! so the resulting member set does not depend on visit order. A cell first
//! rejected from one side is still admitted if another member reaches it
//! through an admissible edge.

use super::grid::{DepthGrid, Membership, MembershipGrid, is_reliable};
use std::collections::VecDeque;
use tracing::trace;

/// Neighbor offsets in enumeration order: +x, -x, +y, -y
const NEIGHBORS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Whether two neighboring depths are close enough to share a region
#[inline]
pub fn within_tolerance(a: i16, b: i16, tolerance: u32) -> bool {
    (a as i32 - b as i32).unsigned_abs() < tolerance
}

/// Grow the region containing `seed`
///
/// The seed is always a member, whatever its depth. Callers clamp the seed
/// into the grid first; an out-of-bounds seed panics in debug builds and is
/// clamped in release builds.
pub fn grow(grid: &DepthGrid, seed: (u32, u32), tolerance: u32) -> MembershipGrid {
    debug_assert!(
        grid.contains(seed.0, seed.1),
        "seed {:?} outside {}x{} grid",
        seed,
        grid.width(),
        grid.height()
    );
    let (sx, sy) = grid.clamp_point(seed.0, seed.1);

    let (width, height) = grid.dimensions();
    let mut membership = MembershipGrid::new(width, height);
    // Cells that have entered the queue; each enters at most once
    let mut queued = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::new();

    membership.set(sx, sy, Membership::Member);
    queued[grid.index(sx, sy)] = true;
    queue.push_back((sx, sy));

    while let Some((px, py)) = queue.pop_front() {
        let current = grid.get(px, py);

        for (dx, dy) in NEIGHBORS {
            let nx = px as i64 + dx;
            let ny = py as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let idx = grid.index(nx, ny);
            if queued[idx] {
                continue;
            }

            let depth = grid.get(nx, ny);
            if is_reliable(depth) && within_tolerance(depth, current, tolerance) {
                membership.set(nx, ny, Membership::Member);
                queued[idx] = true;
                queue.push_back((nx, ny));
            } else {
                membership.set(nx, ny, Membership::RejectedBoundary);
            }
        }
    }

    trace!(
        seed_x = sx,
        seed_y = sy,
        tolerance,
        members = membership.member_count(),
        "Region grown"
    );

    membership
}
