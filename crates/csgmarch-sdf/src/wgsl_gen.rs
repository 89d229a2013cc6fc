//! Surface tree to WGSL code generator
//!
//! Lowers a [`Surface`] tree to a straight-line `scene_sdf` function built
//! from the shared formulas in `csgmarch-math`, then splices it into the
//! base raymarch shader.

// String writing is infallible, so .unwrap() is safe here
// Format args inlining is not always more readable for shader code generation
#![allow(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use csgmarch_math::Vector3;

use crate::Surface;

const SCENE_SDF_MARKER: &str = "// SCENE_SDF_PLACEHOLDER";
const FORMULAS_MARKER: &str = "// SSOT_FORMULAS_PLACEHOLDER";

/// Generate WGSL code for a surface tree
///
/// A subtree reachable through several `Arc` handles is emitted once and its
/// variable reused.
pub struct WgslGenerator {
    var_counter: usize,
    emitted: HashMap<*const Surface, String>,
}

impl WgslGenerator {
    pub fn new() -> Self {
        Self {
            var_counter: 0,
            emitted: HashMap::new(),
        }
    }

    fn next_var(&mut self) -> String {
        let var = format!("d{}", self.var_counter);
        self.var_counter += 1;
        var
    }

    /// Generate the complete `scene_sdf` function
    pub fn generate(&mut self, root: &Surface) -> String {
        self.var_counter = 0;
        self.emitted.clear();
        let mut code = String::new();

        writeln!(code, "fn scene_sdf(p: vec3<f32>) -> f32 {{").unwrap();

        let result = self.generate_node(root, &mut code);

        writeln!(code, "    return {};", result).unwrap();
        writeln!(code, "}}").unwrap();

        tracing::debug!(
            nodes = root.node_count(),
            emitted = self.var_counter,
            "generated scene_sdf"
        );

        code
    }

    fn generate_child(&mut self, child: &Arc<Surface>, code: &mut String) -> String {
        let key = Arc::as_ptr(child);
        if let Some(var) = self.emitted.get(&key) {
            return var.clone();
        }
        let var = self.generate_node(child, code);
        self.emitted.insert(key, var.clone());
        var
    }

    /// Emit code for one node, returning the variable that holds its distance
    fn generate_node(&mut self, node: &Surface, code: &mut String) -> String {
        match node {
            // Primitives
            Surface::Sphere { center, radius } => {
                let var = self.next_var();
                writeln!(
                    code,
                    "    let {} = sd_sphere(p, {}, {});",
                    var,
                    vec3(*center),
                    float(*radius)
                )
                .unwrap();
                var
            }
            Surface::Box {
                center,
                half_extents,
                smoothing,
            } => {
                let var = self.next_var();
                writeln!(
                    code,
                    "    let {} = sd_box(p, {}, {}, {});",
                    var,
                    vec3(*center),
                    vec3(*half_extents),
                    float(*smoothing)
                )
                .unwrap();
                var
            }
            Surface::Plane { normal, distance } => {
                let var = self.next_var();
                writeln!(
                    code,
                    "    let {} = sd_plane(p, {}, {});",
                    var,
                    vec3(*normal),
                    float(*distance)
                )
                .unwrap();
                var
            }
            Surface::Cylinder { start, end, radius } => {
                let var = self.next_var();
                writeln!(
                    code,
                    "    let {} = sd_cylinder(p, {}, {}, {});",
                    var,
                    vec3(*start),
                    vec3(*end),
                    float(*radius)
                )
                .unwrap();
                var
            }

            // Boolean operations
            Surface::Union { left, right }
            | Surface::Intersection { left, right }
            | Surface::Difference { left, right } => {
                let a = self.generate_child(left, code);
                let b = self.generate_child(right, code);
                let var = self.next_var();
                writeln!(code, "    let {} = op_{}({}, {});", var, node.kind(), a, b).unwrap();
                var
            }

            // Smooth boolean operations
            Surface::SmoothUnion { left, right, k }
            | Surface::SmoothIntersection { left, right, k }
            | Surface::SmoothDifference { left, right, k } => {
                let a = self.generate_child(left, code);
                let b = self.generate_child(right, code);
                let var = self.next_var();
                writeln!(
                    code,
                    "    let {} = op_{}({}, {}, {});",
                    var,
                    node.kind(),
                    a,
                    b,
                    float(*k)
                )
                .unwrap();
                var
            }
        }
    }
}

impl Default for WgslGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest `f32` literal that reads back as the same value; tiny and huge
/// magnitudes switch to exponent form instead of rounding to zero.
fn float(v: f64) -> String {
    format!("{:?}", v as f32)
}

fn vec3(v: Vector3) -> String {
    format!("vec3<f32>({}, {}, {})", float(v.x), float(v.y), float(v.z))
}

/// Get the base shader code (everything except the `scene_sdf` function)
pub fn get_base_shader() -> &'static str {
    include_str!("shaders/raymarch.wgsl")
}

/// Replace the placeholder `scene_sdf` function in the base shader
pub fn inject_scene_sdf(base_shader: &str, scene_sdf_code: &str) -> String {
    let Some(start) = base_shader.find(SCENE_SDF_MARKER) else {
        return format!("{}\n{}", base_shader, scene_sdf_code);
    };
    let Some(offset) = base_shader[start..].find("fn scene_sdf") else {
        return format!("{}\n{}", base_shader, scene_sdf_code);
    };
    let func_start = start + offset;

    // Walk braces to the end of the placeholder body
    let mut depth = 0usize;
    let mut func_end = base_shader.len();
    for (i, c) in base_shader[func_start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    func_end = func_start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    let mut result = String::with_capacity(base_shader.len() + scene_sdf_code.len());
    result.push_str(&base_shader[..start]);
    result.push_str(scene_sdf_code);
    result.push_str(&base_shader[func_end..]);
    result
}

/// Inject the shared formulas from csgmarch-math into the shader
fn inject_ssot_formulas(shader: &str) -> String {
    let formulas = csgmarch_math::get_wgsl_code();
    match shader.find(FORMULAS_MARKER) {
        Some(pos) => {
            let mut result = String::with_capacity(shader.len() + formulas.len());
            result.push_str(&shader[..pos]);
            result.push_str(formulas);
            result.push_str(&shader[pos + FORMULAS_MARKER.len()..]);
            result
        }
        None => format!("{}\n{}", formulas, shader),
    }
}

/// Build a complete shader for a surface tree
pub fn build_shader(root: &Surface) -> String {
    let mut generator = WgslGenerator::new();
    let scene_code = generator.generate(root);
    let with_formulas = inject_ssot_formulas(get_base_shader());
    inject_scene_sdf(&with_formulas, &scene_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_sphere() {
        let s = Surface::sphere(Vector3::new(1.0, 0.0, -2.5), 0.75);
        let code = WgslGenerator::new().generate(&s);
        assert!(code.contains("let d0 = sd_sphere(p, vec3<f32>(1.0, 0.0, -2.5), 0.75);"));
        assert!(code.contains("return d0;"));
    }

    #[test]
    fn test_union() {
        let s = Surface::union(
            Surface::sphere(Vector3::ZERO, 1.0),
            Surface::box3(Vector3::ZERO, Vector3::splat(0.5)),
        );
        let code = WgslGenerator::new().generate(&s);
        assert!(code.contains("sd_sphere"));
        assert!(code.contains("sd_box(p, vec3<f32>(0.0, 0.0, 0.0), vec3<f32>(0.5, 0.5, 0.5), 0.1)"));
        assert!(code.contains("let d2 = op_union(d0, d1);"));
    }

    #[test]
    fn test_smooth_ops_carry_blend() {
        let s = Surface::smooth_difference(
            Surface::sphere(Vector3::ZERO, 1.0),
            Surface::cylinder(Vector3::NEG_Z, Vector3::Z, 0.4),
            0.25,
        )
        .unwrap();
        let code = WgslGenerator::new().generate(&s);
        assert!(code.contains("sd_cylinder"));
        assert!(code.contains("op_smooth_difference(d0, d1, 0.25)"));
    }

    #[test]
    fn test_shared_subtree_emitted_once() {
        let shared = Arc::new(Surface::sphere(Vector3::ZERO, 1.0));
        let s = Surface::intersection(
            Surface::union(shared.clone(), Surface::plane(Vector3::Y, 1.0)),
            shared,
        );
        let code = WgslGenerator::new().generate(&s);
        assert_eq!(code.matches("sd_sphere").count(), 1);
        assert!(code.contains("op_intersection(d2, d0)"));
    }

    #[test]
    fn test_build_shader_replaces_placeholders() {
        let s = Surface::sphere(Vector3::ZERO, 2.0);
        let shader = build_shader(&s);
        assert!(!shader.contains(SCENE_SDF_MARKER));
        assert!(!shader.contains(FORMULAS_MARKER));
        assert_eq!(shader.matches("fn scene_sdf(").count(), 1);
        assert!(shader.contains("sd_sphere(p, vec3<f32>(0.0, 0.0, 0.0), 2.0)"));
        for name in csgmarch_math::FORMULA_NAMES {
            assert!(shader.contains(&format!("fn {}(", name)));
        }
        assert!(shader.contains("fn fs_main"));
    }

    #[test]
    fn test_small_parameters_keep_their_value() {
        let s = Surface::smooth_union(
            Surface::sphere(Vector3::new(1.23e-7, 0.0, 0.0), 2.5e-7),
            Surface::plane(Vector3::Y, 0.5),
            1e-7,
        )
        .unwrap();
        let code = WgslGenerator::new().generate(&s);
        assert!(code.contains("sd_sphere(p, vec3<f32>(1.23e-7, 0.0, 0.0), 2.5e-7)"));
        assert!(code.contains("let d2 = op_smooth_union(d0, d1, 1e-7);"));
        assert!(!code.contains("0.000000"));
    }

    #[test]
    fn test_literals_read_back_exactly() {
        for v in [0.1, -2.5, 1e-7, 3.0e-12, 1.0e20, 123_456.79] {
            let parsed: f32 = float(v).parse().unwrap();
            assert_eq!(parsed.to_bits(), (v as f32).to_bits());
        }
    }

    #[test]
    fn test_inject_without_marker_appends() {
        let out = inject_scene_sdf("// no marker", "fn scene_sdf(p: vec3<f32>) -> f32 { return 0.0; }");
        assert!(out.starts_with("// no marker"));
        assert!(out.ends_with("}"));
    }
}
