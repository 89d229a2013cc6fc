//! Implicit surface tree
//!
//! A scene is a tree of [`Surface`] nodes: primitive leaves combined by
//! boolean operations. Children are held through `Arc`, so a subtree can be
//! shared by several parents and a whole scene can be handed to many render
//! threads at once. Trees are built bottom-up and never mutated afterwards,
//! which rules out cycles.

use std::sync::Arc;

use csgmarch_math::{
    Vector3, op_difference, op_intersection, op_smooth_difference,
    op_smooth_intersection, op_smooth_union, op_union, sd_box, sd_cylinder, sd_plane, sd_sphere,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Step used by the central-difference gradient on every axis
pub const GRADIENT_STEP: f64 = 1e-4;

/// Edge rounding applied to boxes unless another value is given
pub const DEFAULT_BOX_SMOOTHING: f64 = 0.1;

/// Anything that can report a signed distance.
///
/// - Returns negative values for points inside the shape
/// - Returns positive values for points outside the shape
/// - Returns zero for points exactly on the surface
///
/// `evaluate` must be a pure function of the point: the ray marcher calls it
/// many times per pixel and the shadow pass re-evaluates the same field from
/// other origins.
pub trait ImplicitSurface: Send + Sync {
    /// Signed distance from `p` to the surface
    fn evaluate(&self, p: Vector3) -> f64;

    /// Unit surface normal at `p`.
    ///
    /// The default differentiates the whole field numerically with symmetric
    /// central differences, so seams between boolean operands are captured
    /// (approximately, within one [`GRADIENT_STEP`] of an edge).
    fn gradient(&self, p: Vector3) -> Vector3 {
        let h = GRADIENT_STEP;
        let dx = self.evaluate(Vector3::new(p.x + h, p.y, p.z))
            - self.evaluate(Vector3::new(p.x - h, p.y, p.z));
        let dy = self.evaluate(Vector3::new(p.x, p.y + h, p.z))
            - self.evaluate(Vector3::new(p.x, p.y - h, p.z));
        let dz = self.evaluate(Vector3::new(p.x, p.y, p.z + h))
            - self.evaluate(Vector3::new(p.x, p.y, p.z - h));

        Vector3::new(dx, dy, dz).normalize_or_zero()
    }
}

impl<T: ImplicitSurface + ?Sized> ImplicitSurface for Arc<T> {
    fn evaluate(&self, p: Vector3) -> f64 {
        (**self).evaluate(p)
    }

    fn gradient(&self, p: Vector3) -> Vector3 {
        (**self).gradient(p)
    }
}

impl<T: ImplicitSurface + ?Sized> ImplicitSurface for &T {
    fn evaluate(&self, p: Vector3) -> f64 {
        (**self).evaluate(p)
    }

    fn gradient(&self, p: Vector3) -> Vector3 {
        (**self).gradient(p)
    }
}

fn default_box_smoothing() -> f64 {
    DEFAULT_BOX_SMOOTHING
}

/// A node of the implicit surface tree.
///
/// The operation set is closed, so evaluation is one exhaustive `match`
/// per node with no dynamic dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Surface {
    // Primitives
    Sphere {
        center: Vector3,
        radius: f64,
    },
    Box {
        center: Vector3,
        half_extents: Vector3,
        #[serde(default = "default_box_smoothing")]
        smoothing: f64,
    },
    Plane {
        normal: Vector3,
        distance: f64,
    },
    Cylinder {
        start: Vector3,
        end: Vector3,
        radius: f64,
    },

    // Boolean operations
    Union {
        left: Arc<Surface>,
        right: Arc<Surface>,
    },
    Intersection {
        left: Arc<Surface>,
        right: Arc<Surface>,
    },
    Difference {
        left: Arc<Surface>,
        right: Arc<Surface>,
    },

    // Smooth boolean operations
    SmoothUnion {
        left: Arc<Surface>,
        right: Arc<Surface>,
        k: f64,
    },
    SmoothIntersection {
        left: Arc<Surface>,
        right: Arc<Surface>,
        k: f64,
    },
    SmoothDifference {
        left: Arc<Surface>,
        right: Arc<Surface>,
        k: f64,
    },
}

impl Surface {
    // === Primitives ===

    /// Sphere of `radius` around `center`
    pub fn sphere(center: Vector3, radius: f64) -> Self {
        Self::Sphere { center, radius }
    }

    /// Axis-aligned box with the default edge rounding
    pub fn box3(center: Vector3, half_extents: Vector3) -> Self {
        Self::rounded_box3(center, half_extents, DEFAULT_BOX_SMOOTHING)
    }

    /// Axis-aligned box whose edges are rounded by `smoothing`
    pub fn rounded_box3(center: Vector3, half_extents: Vector3, smoothing: f64) -> Self {
        Self::Box {
            center,
            half_extents,
            smoothing,
        }
    }

    /// Plane `normal . p + distance = 0`. The normal is normalized here.
    pub fn plane(normal: Vector3, distance: f64) -> Self {
        if normal.length() == 0.0 {
            tracing::warn!("plane built with a zero normal; it will fail validation");
        }
        Self::Plane {
            normal: normal.normalize_or_zero(),
            distance,
        }
    }

    /// Cylinder of `radius` around the segment `start..end`, with round caps
    pub fn cylinder(start: Vector3, end: Vector3, radius: f64) -> Self {
        Self::Cylinder { start, end, radius }
    }

    // === Boolean Operations ===

    /// Union: combine two shapes (OR)
    pub fn union(left: impl Into<Arc<Surface>>, right: impl Into<Arc<Surface>>) -> Self {
        Self::Union {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Intersection: keep only where both shapes overlap (AND)
    pub fn intersection(left: impl Into<Arc<Surface>>, right: impl Into<Arc<Surface>>) -> Self {
        Self::Intersection {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Difference: cut `right` from `left`
    pub fn difference(left: impl Into<Arc<Surface>>, right: impl Into<Arc<Surface>>) -> Self {
        Self::Difference {
            left: left.into(),
            right: right.into(),
        }
    }

    // === Smooth Boolean Operations ===

    /// Smooth union with blend width `k > 0`
    pub fn smooth_union(
        left: impl Into<Arc<Surface>>,
        right: impl Into<Arc<Surface>>,
        k: f64,
    ) -> Result<Self> {
        check_blend("smooth_union", k)?;
        Ok(Self::SmoothUnion {
            left: left.into(),
            right: right.into(),
            k,
        })
    }

    /// Smooth intersection with blend width `k > 0`
    pub fn smooth_intersection(
        left: impl Into<Arc<Surface>>,
        right: impl Into<Arc<Surface>>,
        k: f64,
    ) -> Result<Self> {
        check_blend("smooth_intersection", k)?;
        Ok(Self::SmoothIntersection {
            left: left.into(),
            right: right.into(),
            k,
        })
    }

    /// Smooth difference with blend width `k > 0`
    pub fn smooth_difference(
        left: impl Into<Arc<Surface>>,
        right: impl Into<Arc<Surface>>,
        k: f64,
    ) -> Result<Self> {
        check_blend("smooth_difference", k)?;
        Ok(Self::SmoothDifference {
            left: left.into(),
            right: right.into(),
            k,
        })
    }

    // === Inspection ===

    /// Short snake_case name of the node kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Plane { .. } => "plane",
            Self::Cylinder { .. } => "cylinder",
            Self::Union { .. } => "union",
            Self::Intersection { .. } => "intersection",
            Self::Difference { .. } => "difference",
            Self::SmoothUnion { .. } => "smooth_union",
            Self::SmoothIntersection { .. } => "smooth_intersection",
            Self::SmoothDifference { .. } => "smooth_difference",
        }
    }

    /// The two operands of a boolean node, `None` for primitives
    pub fn children(&self) -> Option<(&Arc<Surface>, &Arc<Surface>)> {
        match self {
            Self::Union { left, right }
            | Self::Intersection { left, right }
            | Self::Difference { left, right }
            | Self::SmoothUnion { left, right, .. }
            | Self::SmoothIntersection { left, right, .. }
            | Self::SmoothDifference { left, right, .. } => Some((left, right)),
            Self::Sphere { .. } | Self::Box { .. } | Self::Plane { .. } | Self::Cylinder { .. } => {
                None
            }
        }
    }

    /// Number of nodes, counting a shared subtree once per reference
    pub fn node_count(&self) -> usize {
        match self.children() {
            Some((left, right)) => 1 + left.node_count() + right.node_count(),
            None => 1,
        }
    }

    /// Length of the longest root-to-leaf path (a lone primitive has depth 1)
    pub fn depth(&self) -> usize {
        match self.children() {
            Some((left, right)) => 1 + left.depth().max(right.depth()),
            None => 1,
        }
    }

    /// Check every node's parameters.
    ///
    /// Constructors already reject bad blend widths; this also covers trees
    /// that arrive through deserialization.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Sphere { center, radius } => {
                check_point("sphere center", *center)?;
                check_non_negative("sphere radius", *radius)
            }
            Self::Box {
                center,
                half_extents,
                smoothing,
            } => {
                check_point("box center", *center)?;
                check_point("box half_extents", *half_extents)?;
                if half_extents.min_element() < 0.0 {
                    return Err(Error::InvalidParameter(format!(
                        "box half_extents must be non-negative, got {}",
                        half_extents
                    )));
                }
                check_finite("box smoothing", *smoothing)
            }
            Self::Plane { normal, distance } => {
                check_point("plane normal", *normal)?;
                if (normal.length() - 1.0).abs() > 1e-6 {
                    return Err(Error::InvalidParameter(format!(
                        "plane normal must be unit length, got {} (length {})",
                        normal,
                        normal.length()
                    )));
                }
                check_finite("plane distance", *distance)
            }
            Self::Cylinder { start, end, radius } => {
                check_point("cylinder start", *start)?;
                check_point("cylinder end", *end)?;
                check_non_negative("cylinder radius", *radius)
            }
            Self::Union { left, right }
            | Self::Intersection { left, right }
            | Self::Difference { left, right } => {
                left.validate()?;
                right.validate()
            }
            Self::SmoothUnion { left, right, k }
            | Self::SmoothIntersection { left, right, k }
            | Self::SmoothDifference { left, right, k } => {
                check_blend(self.kind(), *k)?;
                left.validate()?;
                right.validate()
            }
        }
    }
}

impl ImplicitSurface for Surface {
    fn evaluate(&self, p: Vector3) -> f64 {
        match self {
            // === Primitives ===
            Self::Sphere { center, radius } => sd_sphere(p, *center, *radius),

            Self::Box {
                center,
                half_extents,
                smoothing,
            } => sd_box(p, *center, *half_extents, *smoothing),

            Self::Plane { normal, distance } => sd_plane(p, *normal, *distance),

            Self::Cylinder { start, end, radius } => sd_cylinder(p, *start, *end, *radius),

            // === Boolean Operations ===
            Self::Union { left, right } => op_union(left.evaluate(p), right.evaluate(p)),

            Self::Intersection { left, right } => {
                op_intersection(left.evaluate(p), right.evaluate(p))
            }

            Self::Difference { left, right } => op_difference(left.evaluate(p), right.evaluate(p)),

            // === Smooth Boolean Operations ===
            Self::SmoothUnion { left, right, k } => {
                op_smooth_union(left.evaluate(p), right.evaluate(p), *k)
            }

            Self::SmoothIntersection { left, right, k } => {
                op_smooth_intersection(left.evaluate(p), right.evaluate(p), *k)
            }

            Self::SmoothDifference { left, right, k } => {
                op_smooth_difference(left.evaluate(p), right.evaluate(p), *k)
            }
        }
    }
}

fn check_blend(op: &str, k: f64) -> Result<()> {
    if k.is_finite() && k > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} blend factor k must be finite and > 0, got {}",
            op, k
        )))
    }
}

fn check_finite(what: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be finite, got {}",
            what, value
        )))
    }
}

fn check_non_negative(what: &str, value: f64) -> Result<()> {
    check_finite(what, value)?;
    if value < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "{} must be non-negative, got {}",
            what, value
        )));
    }
    Ok(())
}

fn check_point(what: &str, v: Vector3) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be finite, got {}",
            what, v
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn unit_sphere() -> Surface {
        Surface::sphere(Vector3::ZERO, 1.0)
    }

    fn samples() -> Vec<Vector3> {
        let mut points = Vec::new();
        for i in -4..=4 {
            for j in -3..=3 {
                let x = f64::from(i) * 0.45;
                let y = f64::from(j) * 0.6 + 0.05;
                points.push(Vector3::new(x, y, 0.3 * x - 0.2 * y));
            }
        }
        points
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    #[test]
    fn sphere_zero_on_surface() {
        let s = Surface::sphere(Vector3::new(1.0, -2.0, 0.5), 0.75);
        let on_surface = Vector3::new(1.0, -2.0, 0.5) + Vector3::new(0.0, 0.6, 0.45);
        assert_abs_diff_eq!(s.evaluate(on_surface), 0.0, epsilon = 1e-12);
        assert!(s.evaluate(Vector3::new(1.0, -2.0, 0.5)) < 0.0);
    }

    #[test]
    fn box_zero_on_smoothed_face() {
        let b = Surface::box3(Vector3::ZERO, Vector3::splat(0.8));
        assert_abs_diff_eq!(
            b.evaluate(Vector3::new(0.8 + DEFAULT_BOX_SMOOTHING, 0.0, 0.0)),
            0.0,
            epsilon = 1e-12
        );
        let sharp = Surface::rounded_box3(Vector3::ZERO, Vector3::splat(0.8), 0.0);
        assert_abs_diff_eq!(
            sharp.evaluate(Vector3::new(0.0, 0.0, -0.8)),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn plane_normalizes_and_evaluates() {
        let p = Surface::plane(Vector3::new(0.0, 2.0, 0.0), 1.0);
        let Surface::Plane { normal, .. } = &p else {
            panic!("expected a plane");
        };
        assert_relative_eq!(normal.length(), 1.0);
        assert_abs_diff_eq!(p.evaluate(Vector3::new(5.0, -1.0, 3.0)), 0.0);
        assert_abs_diff_eq!(p.evaluate(Vector3::new(0.0, 1.0, 0.0)), 2.0);
    }

    #[test]
    fn cylinder_zero_on_wall() {
        let c = Surface::cylinder(Vector3::new(0.0, 0.0, -1.5), Vector3::new(0.0, 0.0, 1.5), 0.4);
        assert_abs_diff_eq!(c.evaluate(Vector3::new(0.0, 0.4, 1.0)), 0.0, epsilon = 1e-12);
        // Round cap
        assert_abs_diff_eq!(c.evaluate(Vector3::new(0.0, 0.0, 1.9)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_length_cylinder_is_a_sphere() {
        let c = Surface::cylinder(Vector3::ONE, Vector3::ONE, 0.5);
        let d = c.evaluate(Vector3::new(1.0, 3.0, 1.0));
        assert!(d.is_finite());
        assert_abs_diff_eq!(d, 1.5, epsilon = 1e-12);
    }

    // ------------------------------------------------------------------------
    // Boolean Operations
    // ------------------------------------------------------------------------

    #[test]
    fn hard_ops_match_min_max_exactly() {
        let a = Surface::sphere(Vector3::new(-0.5, 0.0, 0.0), 1.0);
        let b = Surface::box3(Vector3::new(0.5, 0.1, 0.0), Vector3::new(0.8, 0.6, 0.7));
        let u = Surface::union(a.clone(), b.clone());
        let i = Surface::intersection(a.clone(), b.clone());
        let d = Surface::difference(a.clone(), b.clone());

        for p in samples() {
            let (da, db) = (a.evaluate(p), b.evaluate(p));
            assert_eq!(u.evaluate(p), da.min(db));
            assert_eq!(i.evaluate(p), da.max(db));
            assert_eq!(d.evaluate(p), da.max(-db));
        }
    }

    #[test]
    fn smooth_ops_converge_to_hard_ops() {
        let a = Surface::sphere(Vector3::new(-0.5, 0.0, 0.0), 1.0);
        let b = Surface::sphere(Vector3::new(0.5, 0.0, 0.0), 1.0);
        let k = 0.001;
        let su = Surface::smooth_union(a.clone(), b.clone(), k).unwrap();
        let si = Surface::smooth_intersection(a.clone(), b.clone(), k).unwrap();
        let sd = Surface::smooth_difference(a.clone(), b.clone(), k).unwrap();
        let u = Surface::union(a.clone(), b.clone());
        let i = Surface::intersection(a.clone(), b.clone());
        let d = Surface::difference(a, b);

        for p in samples() {
            assert!((su.evaluate(p) - u.evaluate(p)).abs() <= k / 6.0 + 1e-15);
            assert!((si.evaluate(p) - i.evaluate(p)).abs() <= k / 6.0 + 1e-15);
            assert!((sd.evaluate(p) - d.evaluate(p)).abs() <= k / 6.0 + 1e-15);
        }
    }

    #[test]
    fn smooth_union_bulges_on_the_seam() {
        let a = Surface::sphere(Vector3::new(-0.5, 0.0, 0.0), 1.0);
        let b = Surface::sphere(Vector3::new(0.5, 0.0, 0.0), 1.0);
        let su = Surface::smooth_union(a.clone(), b.clone(), 0.3).unwrap();
        let u = Surface::union(a, b);
        // Equidistant from both centers: full blend, k / 6 deeper
        let p = Vector3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(su.evaluate(p), u.evaluate(p) - 0.05, epsilon = 1e-12);
    }

    #[test]
    fn smooth_ops_reject_bad_blend() {
        for k in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(Surface::smooth_union(unit_sphere(), unit_sphere(), k).is_err());
            assert!(Surface::smooth_intersection(unit_sphere(), unit_sphere(), k).is_err());
            assert!(Surface::smooth_difference(unit_sphere(), unit_sphere(), k).is_err());
        }
    }

    #[test]
    fn shared_subtree_evaluates_consistently() {
        let shared = Arc::new(unit_sphere());
        let left = Surface::union(shared.clone(), Surface::sphere(Vector3::X * 3.0, 0.5));
        let tree = Surface::difference(left, shared.clone());
        assert_eq!(Arc::strong_count(&shared), 3);
        // Inside the shared sphere the difference removes everything
        assert!(tree.evaluate(Vector3::ZERO) > 0.0);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
    }

    // ------------------------------------------------------------------------
    // Gradient
    // ------------------------------------------------------------------------

    #[test]
    fn sphere_gradient_points_radially() {
        let center = Vector3::new(0.3, -0.2, 0.1);
        let s = Surface::sphere(center, 1.0);
        for p in samples() {
            if (p - center).length() < 0.5 {
                continue;
            }
            let n = s.gradient(p);
            let expected = (p - center).normalize();
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-9);
            assert!((n - expected).length() < 1e-6, "at {p}: {n} vs {expected}");
        }
    }

    #[test]
    fn gradient_uses_the_combined_field() {
        // On the +X side of a union the right sphere wins
        let u = Surface::union(
            Surface::sphere(Vector3::new(-0.5, 0.0, 0.0), 1.0),
            Surface::sphere(Vector3::new(0.5, 0.0, 0.0), 1.0),
        );
        let n = u.gradient(Vector3::new(1.5, 0.0, 0.0));
        assert!((n - Vector3::X).length() < 1e-6);
    }

    #[test]
    fn gradient_at_flat_field_is_zero_not_nan() {
        let flat = Surface::plane(Vector3::ZERO, 1.0);
        let n = flat.gradient(Vector3::ONE);
        assert_eq!(n, Vector3::ZERO);
    }

    // ------------------------------------------------------------------------
    // Validation and persistence
    // ------------------------------------------------------------------------

    #[test]
    fn validate_catches_deserialized_bad_blend() {
        let json = r#"{
            "type": "smooth_union",
            "left": { "type": "sphere", "center": [0.0, 0.0, 0.0], "radius": 1.0 },
            "right": { "type": "sphere", "center": [1.0, 0.0, 0.0], "radius": 1.0 },
            "k": 0.0
        }"#;
        let surface: Surface = serde_json::from_str(json).unwrap();
        assert!(matches!(
            surface.validate(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_plane_normal() {
        assert!(Surface::plane(Vector3::ZERO, 0.0).validate().is_err());
        assert!(Surface::plane(Vector3::Y, 0.0).validate().is_ok());
    }

    #[test]
    fn box_smoothing_defaults_when_missing() {
        let json = r#"{ "type": "box", "center": [0.0, 0.0, 0.0], "half_extents": [1.0, 1.0, 1.0] }"#;
        let surface: Surface = serde_json::from_str(json).unwrap();
        assert_eq!(surface, Surface::box3(Vector3::ZERO, Vector3::ONE));
    }

    #[test]
    fn json_preserves_evaluation() {
        let tree = Surface::smooth_difference(
            Surface::union(unit_sphere(), Surface::sphere(Vector3::Y, 0.5)),
            Surface::cylinder(Vector3::NEG_Z, Vector3::Z, 0.25),
            0.1,
        )
        .unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let back: Surface = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        for p in samples() {
            assert_relative_eq!(back.evaluate(p), tree.evaluate(p), epsilon = 1e-12);
        }
    }
}
