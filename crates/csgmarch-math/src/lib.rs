//! csgmarch Math - Single Source of Truth for implicit-surface formulas
//!
//! This crate holds the vector algebra used in scene space and every formula
//! the renderer depends on: primitive distance functions, hard and smooth
//! boolean combinations, and the step-count shading factor. The formulas are
//! defined once in TOML specification files and code is auto-generated so the
//! CPU evaluator and the WGSL shader can never drift apart.
//!
//! # Architecture
//!
//! ```text
//! formulas/*.toml  →  [build.rs]  →  Rust code (this crate, f64)
//!                                 →  WGSL code (for shaders, f32)
//!                                 →  Test vectors
//!                                 →  Documentation
//! ```
//!
//! # Adding New Formulas
//!
//! 1. Create a new `.toml` file in `formulas/`
//! 2. Define the formula spec (see `op_smooth_union.toml` as example)
//! 3. Run `cargo build` to generate code
//! 4. Use the generated function in the evaluator and shader generator
//!
//! # Example
//!
//! ```rust
//! use csgmarch_math::{op_smooth_union, op_union};
//!
//! // Far outside the blend band the smooth union is the hard union
//! assert_eq!(op_smooth_union(0.0, 5.0, 0.1), op_union(0.0, 5.0));
//! ```

pub mod vector;

// Include the auto-generated Rust implementations
#[allow(clippy::doc_markdown)]
mod generated {
    include!(concat!(env!("OUT_DIR"), "/formulas.rs"));
}
pub use generated::*;
pub use vector::Vector3;

/// Get the WGSL code for all formulas
///
/// Generated from the same TOML specs as the Rust implementations.
pub fn get_wgsl_code() -> &'static str {
    include_str!(concat!(env!("OUT_DIR"), "/formulas.wgsl"))
}

/// Get the markdown documentation for all formulas
pub fn get_docs() -> &'static str {
    include_str!(concat!(env!("OUT_DIR"), "/FORMULAS.md"))
}

#[cfg(test)]
#[allow(clippy::unreadable_literal)]
mod tests {
    use super::*;
    use glam::DVec3;

    // Include auto-generated tests
    include!(concat!(env!("OUT_DIR"), "/tests.rs"));

    #[test]
    fn test_wgsl_code_has_every_formula() {
        let wgsl = get_wgsl_code();
        for name in FORMULA_NAMES {
            assert!(
                wgsl.contains(&format!("fn {}(", name)),
                "WGSL should contain {}",
                name
            );
        }
    }

    #[test]
    fn test_smooth_ops_are_cubic_in_wgsl() {
        let wgsl = get_wgsl_code();
        assert!(wgsl.contains("h * h * h * k * (1.0 / 6.0)"));
        assert!(!wgsl.contains("mix(d2, d1, h)"));
    }

    #[test]
    fn test_docs_generated() {
        let docs = get_docs();
        assert!(docs.contains("op_smooth_difference"));
        assert!(docs.contains("## Test Vectors"));
    }

    #[test]
    fn test_hard_ops_are_exact() {
        let samples = [(-1.25, 0.5), (0.0, 0.0), (3.5, -2.0), (1e-9, -1e-9)];
        for (a, b) in samples {
            assert_eq!(op_union(a, b), a.min(b));
            assert_eq!(op_intersection(a, b), a.max(b));
            assert_eq!(op_difference(a, b), a.max(-b));
        }
    }

    #[test]
    fn test_smooth_ops_converge_to_hard() {
        let k = 1e-6;
        for (a, b) in [(-0.3, 0.7), (0.2, 0.2), (1.0, -1.0)] {
            assert!((op_smooth_union(a, b, k) - op_union(a, b)).abs() < k);
            assert!((op_smooth_intersection(a, b, k) - op_intersection(a, b)).abs() < k);
            assert!((op_smooth_difference(a, b, k) - op_difference(a, b)).abs() < k);
        }
    }

    #[test]
    fn test_box_distance_along_axis() {
        // Unit cube seen along +X at distance 2 from the face
        let d = sd_box(DVec3::new(3.0, 0.0, 0.0), DVec3::ZERO, DVec3::ONE, 0.0);
        approx::assert_relative_eq!(d, 2.0);
    }
}
