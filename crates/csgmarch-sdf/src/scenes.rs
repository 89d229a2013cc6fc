//! Built-in demonstration scenes
//!
//! Five indexed scenes (keys `1`-`5`) plus one custom smooth-blend scene
//! (key `C`). Every call to [`SceneId::build`] returns a fresh tree.

use std::fmt;
use std::str::FromStr;

use csgmarch_math::Vector3;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_BOX_SMOOTHING, Error, Surface};

/// Identifier of a built-in scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneId {
    Sphere,
    Union,
    #[default]
    Intersection,
    Difference,
    Complex,
    Custom,
}

impl SceneId {
    /// Every scene, indexed scenes first
    pub const ALL: [SceneId; 6] = [
        SceneId::Sphere,
        SceneId::Union,
        SceneId::Intersection,
        SceneId::Difference,
        SceneId::Complex,
        SceneId::Custom,
    ];

    /// Scene for a zero-based index; only 0 through 4 are indexed
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Sphere),
            1 => Some(Self::Union),
            2 => Some(Self::Intersection),
            3 => Some(Self::Difference),
            4 => Some(Self::Complex),
            _ => None,
        }
    }

    /// Zero-based index, `None` for the custom scene
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Sphere => Some(0),
            Self::Union => Some(1),
            Self::Intersection => Some(2),
            Self::Difference => Some(3),
            Self::Complex => Some(4),
            Self::Custom => None,
        }
    }

    /// Scene selected by a keyboard key: `1`-`5` or `C`/`c`
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'c' | 'C' => Some(Self::Custom),
            '1'..='5' => key
                .to_digit(10)
                .and_then(|d| Self::from_index(d as usize - 1)),
            _ => None,
        }
    }

    /// Keyboard key that selects this scene
    pub fn key(self) -> char {
        match self {
            Self::Sphere => '1',
            Self::Union => '2',
            Self::Intersection => '3',
            Self::Difference => '4',
            Self::Complex => '5',
            Self::Custom => 'C',
        }
    }

    /// Machine name, as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
            Self::Complex => "complex",
            Self::Custom => "custom",
        }
    }

    /// Human-readable description
    pub fn title(self) -> &'static str {
        match self {
            Self::Sphere => "Single sphere",
            Self::Union => "Union of two spheres",
            Self::Intersection => "Sphere intersected with a box",
            Self::Difference => "Sphere minus an offset box",
            Self::Complex => "Two-sphere union minus a box",
            Self::Custom => "Smooth blend of spheres, box and cylinder",
        }
    }

    /// Build a fresh surface tree for this scene
    pub fn build(self) -> Surface {
        match self {
            Self::Sphere => sphere_scene(),
            Self::Union => union_scene(),
            Self::Intersection => intersection_scene(),
            Self::Difference => difference_scene(),
            Self::Complex => complex_scene(),
            Self::Custom => custom_scene(),
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneId {
    type Err = Error;

    /// Accepts a scene name (case-insensitive) or its keyboard key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_key(c).ok_or_else(|| Error::UnknownScene(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownScene(s.to_string()))
    }
}

/// Unit sphere at the origin
pub fn sphere_scene() -> Surface {
    Surface::sphere(Vector3::ZERO, 1.0)
}

/// Two overlapping unit spheres
pub fn union_scene() -> Surface {
    Surface::union(
        Surface::sphere(Vector3::new(-0.5, 0.0, 0.0), 1.0),
        Surface::sphere(Vector3::new(0.5, 0.0, 0.0), 1.0),
    )
}

/// Unit sphere clipped by a centered box
pub fn intersection_scene() -> Surface {
    Surface::intersection(
        Surface::sphere(Vector3::ZERO, 1.0),
        Surface::box3(Vector3::ZERO, Vector3::splat(0.8)),
    )
}

/// Unit sphere with an offset box carved out
pub fn difference_scene() -> Surface {
    Surface::difference(
        Surface::sphere(Vector3::ZERO, 1.0),
        Surface::box3(Vector3::new(0.5, 0.0, 0.0), Vector3::splat(0.8)),
    )
}

/// Two large spheres joined, with a centered box carved out
pub fn complex_scene() -> Surface {
    Surface::difference(
        Surface::union(
            Surface::sphere(Vector3::new(-1.0, 0.0, 0.0), 1.2),
            Surface::sphere(Vector3::new(1.0, 0.0, 0.0), 1.2),
        ),
        Surface::box3(Vector3::ZERO, Vector3::splat(0.8)),
    )
}

/// Two spheres blended together, cut by a long box, then trimmed to a
/// cylinder along Z. All blends are smooth.
pub fn custom_scene() -> Surface {
    // Blend widths are fixed positive constants, so the nodes are built
    // directly instead of through the fallible constructors.
    let blob = Surface::SmoothUnion {
        left: Surface::sphere(Vector3::new(-0.8, 0.3, 0.0), 1.0).into(),
        right: Surface::sphere(Vector3::new(0.8, -0.2, 0.0), 0.8).into(),
        k: 0.2,
    };
    let cut = Surface::SmoothDifference {
        left: blob.into(),
        right: Surface::rounded_box3(
            Vector3::ZERO,
            Vector3::new(0.6, 0.6, 2.0),
            DEFAULT_BOX_SMOOTHING,
        )
        .into(),
        k: 0.1,
    };
    Surface::SmoothIntersection {
        left: cut.into(),
        right: Surface::cylinder(Vector3::new(0.0, 0.0, -1.5), Vector3::new(0.0, 0.0, 1.5), 0.4)
            .into(),
        k: 0.1,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ImplicitSurface;

    #[test]
    fn default_is_intersection() {
        assert_eq!(SceneId::default(), SceneId::Intersection);
    }

    #[test]
    fn index_and_key_agree() {
        for (i, id) in SceneId::ALL.iter().take(5).enumerate() {
            assert_eq!(SceneId::from_index(i), Some(*id));
            assert_eq!(id.index(), Some(i));
            assert_eq!(SceneId::from_key(id.key()), Some(*id));
        }
        assert_eq!(SceneId::from_index(5), None);
        assert_eq!(SceneId::Custom.index(), None);
        assert_eq!(SceneId::from_key('c'), Some(SceneId::Custom));
        assert_eq!(SceneId::from_key('6'), None);
        assert_eq!(SceneId::from_key('0'), None);
    }

    #[test]
    fn parse_names_and_keys() {
        assert_eq!("Union".parse::<SceneId>().unwrap(), SceneId::Union);
        assert_eq!(" complex ".parse::<SceneId>().unwrap(), SceneId::Complex);
        assert_eq!("1".parse::<SceneId>().unwrap(), SceneId::Sphere);
        assert_eq!("C".parse::<SceneId>().unwrap(), SceneId::Custom);
        assert!(matches!(
            "torus".parse::<SceneId>(),
            Err(Error::UnknownScene(_))
        ));
        for id in SceneId::ALL {
            assert_eq!(id.to_string().parse::<SceneId>().unwrap(), id);
        }
    }

    #[test]
    fn every_scene_is_valid() {
        for id in SceneId::ALL {
            let s = id.build();
            s.validate().unwrap();
            assert!(s.evaluate(Vector3::new(0.0, 0.0, 5.0)) > 0.0, "{id}");
        }
    }

    #[test]
    fn builds_are_independent() {
        let a = SceneId::Custom.build();
        let b = SceneId::Custom.build();
        assert_eq!(a, b);
    }

    #[test]
    fn intersection_scene_is_inside_at_origin() {
        assert!(intersection_scene().evaluate(Vector3::ZERO) < 0.0);
    }

    #[test]
    fn difference_scene_is_carved_on_positive_x() {
        let s = difference_scene();
        assert!(s.evaluate(Vector3::new(0.5, 0.0, 0.0)) > 0.0);
        assert!(s.evaluate(Vector3::new(-0.7, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn custom_scene_shape() {
        let s = custom_scene();
        assert_eq!(s.node_count(), 7);
        assert_eq!(s.depth(), 4);
        assert!(matches!(s, Surface::SmoothIntersection { .. }));
    }
}
