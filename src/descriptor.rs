//! Fish descriptors: the externally supplied specification of one fish.
//!
//! Descriptors are immutable values keyed by a stable id. The scene never
//! mutates a descriptor; behavior changes arrive as replacement lists that
//! the reconciler diffs against the live set.

use glam::Vec3;
use std::path::PathBuf;

/// Stable identity for a fish across descriptor updates.
///
/// Generated fish (procedural or AI-shaped) use dense integer ids handed out
/// by the behavior generator; image fish are keyed by an opaque string
/// (typically the source path). The two namespaces never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FishId {
    Generated(u32),
    Image(String),
}

impl std::fmt::Display for FishId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FishId::Generated(n) => write!(f, "fish#{}", n),
            FishId::Image(name) => write!(f, "image:{}", name),
        }
    }
}

/// Swimming-pattern tag assigned by the behavior generator.
///
/// Carried as descriptor data; the physics stepper does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwimPattern {
    Straight,
    LazyS,
    Circle,
    Erratic,
}

/// Body primitive for an AI-shaped fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Ellipsoid,
    Box,
}

/// Tail primitive for an AI-shaped fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailShape {
    Cone,
    Triangle,
}

/// Shape specification returned by the behavior generator for AI-shaped fish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSpec {
    pub body: BodyShape,
    /// Full bounding-box dimensions of the body (x = width, y = height,
    /// z = length along the swim direction).
    pub body_size: Vec3,
    pub tail: TailShape,
    /// Tail dimensions: x = radius/half-width, y = length.
    pub tail_size: glam::Vec2,
    pub dorsal_fin: bool,
}

/// Where an image fish's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// What kind of fish a descriptor requests.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    Procedural,
    AiShaped(ShapeSpec),
    Image(ImageSource),
}

/// Externally supplied specification of one fish.
#[derive(Debug, Clone, PartialEq)]
pub struct FishDescriptor {
    pub id: FishId,
    pub kind: DescriptorKind,
    pub start_position: Vec3,
    pub pattern: SwimPattern,
}

impl FishDescriptor {
    pub fn procedural(id: u32, start_position: Vec3, pattern: SwimPattern) -> Self {
        Self {
            id: FishId::Generated(id),
            kind: DescriptorKind::Procedural,
            start_position,
            pattern,
        }
    }

    pub fn ai_shaped(id: u32, start_position: Vec3, pattern: SwimPattern, shape: ShapeSpec) -> Self {
        Self {
            id: FishId::Generated(id),
            kind: DescriptorKind::AiShaped(shape),
            start_position,
            pattern,
        }
    }

    pub fn image(key: impl Into<String>, source: ImageSource, start_position: Vec3) -> Self {
        Self {
            id: FishId::Image(key.into()),
            kind: DescriptorKind::Image(source),
            start_position,
            pattern: SwimPattern::Straight,
        }
    }

    /// Reject descriptors that would corrupt the simulation: non-finite
    /// start positions or degenerate shape dimensions. Invalid descriptors
    /// are dropped with a diagnostic during reconciliation.
    pub fn validate(&self) -> Result<(), String> {
        if !self.start_position.is_finite() {
            return Err(format!("{}: non-finite start position", self.id));
        }
        if let DescriptorKind::AiShaped(spec) = &self.kind {
            if !(spec.body_size.is_finite() && spec.tail_size.is_finite()) {
                return Err(format!("{}: non-finite shape dimensions", self.id));
            }
            if spec.body_size.min_element() <= 0.0 || spec.tail_size.min_element() <= 0.0 {
                return Err(format!("{}: non-positive shape dimensions", self.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> ShapeSpec {
        ShapeSpec {
            body: BodyShape::Ellipsoid,
            body_size: Vec3::new(0.4, 0.3, 0.8),
            tail: TailShape::Cone,
            tail_size: glam::Vec2::new(0.15, 0.4),
            dorsal_fin: true,
        }
    }

    #[test]
    fn test_valid_descriptor_passes() {
        let d = FishDescriptor::ai_shaped(3, Vec3::ZERO, SwimPattern::Circle, shape());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_nan_position_rejected() {
        let d = FishDescriptor::procedural(0, Vec3::new(f32::NAN, 0.0, 0.0), SwimPattern::Straight);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_degenerate_shape_rejected() {
        let mut spec = shape();
        spec.body_size.y = 0.0;
        let d = FishDescriptor::ai_shaped(1, Vec3::ZERO, SwimPattern::LazyS, spec);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_id_namespaces_are_distinct() {
        let generated = FishId::Generated(7);
        let image = FishId::Image("7".to_string());
        assert_ne!(generated, image);
    }
}
