//! Scene-space vector algebra
//!
//! Scene math runs in double precision on [`glam::DVec3`]. Degenerate
//! directions go through `normalize_or_zero`, so a zero vector stays zero
//! instead of turning into NaN.

use glam::DVec3;

/// 3D vector in scene space (double precision)
pub type Vector3 = DVec3;
