//! Integration tests for scene building, persistence and shader generation

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use csgmarch_math::Vector3;
use csgmarch_sdf::{ImplicitSurface, SceneId, Surface, build_shader};

#[test]
fn every_scene_survives_json() {
    let probes = [
        Vector3::ZERO,
        Vector3::new(0.0, 0.0, 5.0),
        Vector3::new(0.9, 0.2, -0.1),
        Vector3::new(-1.1, 0.4, 0.3),
    ];

    for id in SceneId::ALL {
        let scene = id.build();
        let json = serde_json::to_string_pretty(&scene).expect("scene should serialize");
        let back: Surface = serde_json::from_str(&json).expect("scene should deserialize");
        back.validate().expect("round-tripped scene should validate");

        for p in probes {
            approx::assert_relative_eq!(back.evaluate(p), scene.evaluate(p), epsilon = 1e-12);
        }
    }
}

#[test]
fn every_scene_generates_a_shader() {
    for id in SceneId::ALL {
        let scene = id.build();
        let shader = build_shader(&scene);
        assert_eq!(shader.matches("fn scene_sdf(").count(), 1, "{id}");
        assert!(shader.contains("fn ray_march("), "{id}");
    }
}

#[test]
fn custom_scene_uses_every_smooth_op() {
    let shader = build_shader(&SceneId::Custom.build());
    assert!(shader.contains("= op_smooth_union(d0, d1, 0.2);"));
    assert!(shader.contains("= op_smooth_difference(d2, d3, 0.1);"));
    assert!(shader.contains("= op_smooth_intersection(d4, d5, 0.1);"));
}

#[test]
fn rejects_malformed_scene_file() {
    let json = r#"{ "type": "sphere", "center": [0.0, 0.0, 0.0], "radius": -1.0 }"#;
    let scene: Surface = serde_json::from_str(json).unwrap();
    assert!(scene.validate().is_err());

    let unknown = r#"{ "type": "torus", "radius": 1.0 }"#;
    assert!(serde_json::from_str::<Surface>(unknown).is_err());
}
