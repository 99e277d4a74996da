//! Scene light description.

use glam::Vec3;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
    /// Sky/ground gradient light with a fixed hemisphere direction.
    Hemispheric,
}

#[derive(Debug, Clone)]
pub struct Light {
    pub id: Uuid,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,

    // Transform
    pub position: Vec3,
    pub direction: Vec3, // for Directional, Spot & Hemispheric

    // Parameters
    pub range: f32,      // for Point & Spot
    pub inner_cone: f32, // for Spot
    pub outer_cone: f32, // for Spot

    pub cast_shadow: bool,
    pub shadow_bias: f32,
}

impl Light {
    #[must_use]
    pub fn new_directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: LightKind::Directional,
            color,
            intensity,
            position: Vec3::ZERO,
            direction: direction.normalize_or_zero(),
            range: 0.0,
            inner_cone: 0.0,
            outer_cone: 0.0,
            cast_shadow: false,
            shadow_bias: 0.005,
        }
    }

    #[must_use]
    pub fn new_point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: LightKind::Point,
            color,
            intensity,
            position,
            direction: Vec3::ZERO,
            range,
            inner_cone: 0.0,
            outer_cone: 0.0,
            cast_shadow: false,
            shadow_bias: 0.005,
        }
    }

    #[must_use]
    pub fn new_spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: LightKind::Spot,
            color,
            intensity,
            position,
            direction: direction.normalize_or_zero(),
            range,
            inner_cone,
            outer_cone,
            cast_shadow: false,
            shadow_bias: 0.005,
        }
    }

    #[must_use]
    pub fn new_hemispheric(up: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: LightKind::Hemispheric,
            color,
            intensity,
            position: Vec3::ZERO,
            direction: up.normalize_or_zero(),
            range: 0.0,
            inner_cone: 0.0,
            outer_cone: 0.0,
            cast_shadow: false,
            shadow_bias: 0.005,
        }
    }

    /// Direction from the surface toward the light, by light kind:
    /// directional lights use the negated light vector, positional lights
    /// the normalized surface-to-light vector, hemispheric lights their
    /// fixed hemisphere direction.
    #[must_use]
    pub fn shading_direction(&self, surface_point: Vec3) -> Vec3 {
        match self.kind {
            LightKind::Directional => (-self.direction).normalize_or_zero(),
            LightKind::Point | LightKind::Spot => {
                (self.position - surface_point).normalize_or_zero()
            }
            LightKind::Hemispheric => self.direction.normalize_or_zero(),
        }
    }

    /// Light color premultiplied by intensity, as seen by the evaluator.
    #[must_use]
    pub fn effective_color(&self) -> Vec3 {
        self.color * self.intensity
    }
}
