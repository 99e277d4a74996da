//! Texture references and material texture slots.
//!
//! Textures themselves are owned and decoded by the host engine; the material
//! core only needs identity, an alpha-channel hint, and a readiness state it
//! can poll without blocking. Readiness is published by the host through an
//! atomic, so polling from the frame thread never suspends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{Mat4, Vec2, Vec3};
use uuid::Uuid;

#[derive(Debug)]
struct TextureInner {
    id: Uuid,
    label: String,
    has_alpha: bool,
    /// Non-blocking textures may be sampled before their data arrives
    /// (the host substitutes a placeholder); blocking ones hold up
    /// flag resolution until ready.
    non_blocking: bool,
    ready: AtomicBool,
}

/// A shared handle to a host-owned texture.
#[derive(Debug, Clone)]
pub struct TextureRef(Arc<TextureInner>);

impl TextureRef {
    /// Creates a handle that is ready immediately.
    #[must_use]
    pub fn ready(label: &str) -> Self {
        Self(Arc::new(TextureInner {
            id: Uuid::new_v4(),
            label: label.to_string(),
            has_alpha: false,
            non_blocking: false,
            ready: AtomicBool::new(true),
        }))
    }

    /// Creates a handle whose data is still loading.
    #[must_use]
    pub fn loading(label: &str) -> Self {
        Self(Arc::new(TextureInner {
            id: Uuid::new_v4(),
            label: label.to_string(),
            has_alpha: false,
            non_blocking: false,
            ready: AtomicBool::new(false),
        }))
    }

    /// Marks the texture as carrying a meaningful alpha channel.
    #[must_use]
    pub fn with_alpha(self) -> Self {
        let mut inner = Arc::try_unwrap(self.0).unwrap_or_else(|arc| TextureInner {
            id: arc.id,
            label: arc.label.clone(),
            has_alpha: arc.has_alpha,
            non_blocking: arc.non_blocking,
            ready: AtomicBool::new(arc.ready.load(Ordering::Acquire)),
        });
        inner.has_alpha = true;
        Self(Arc::new(inner))
    }

    /// Marks the texture as non-blocking (may render before ready).
    #[must_use]
    pub fn non_blocking(self) -> Self {
        let mut inner = Arc::try_unwrap(self.0).unwrap_or_else(|arc| TextureInner {
            id: arc.id,
            label: arc.label.clone(),
            has_alpha: arc.has_alpha,
            non_blocking: arc.non_blocking,
            ready: AtomicBool::new(arc.ready.load(Ordering::Acquire)),
        });
        inner.non_blocking = true;
        Self(Arc::new(inner))
    }

    /// Publishes readiness. Called by the host when upload completes.
    pub fn mark_ready(&self) {
        self.0.ready.store(true, Ordering::Release);
    }

    /// Polls readiness without blocking.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.ready.load(Ordering::Acquire)
    }

    /// Readiness test used by flag resolution: a non-blocking texture counts
    /// as usable even before its data arrives.
    #[inline]
    #[must_use]
    pub fn is_ready_or_not_blocking(&self) -> bool {
        self.0.non_blocking || self.is_ready()
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    #[inline]
    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.0.has_alpha
    }
}

/// UV transform applied to a texture slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl TextureTransform {
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// UV transform as a column-major 4x4 matrix (uniform slot layout uses
    /// 16 components for all texture matrices).
    #[must_use]
    pub fn compute_matrix(&self) -> Mat4 {
        let (sin, cos) = self.rotation.sin_cos();
        let rot_scale = Mat4::from_cols_array(&[
            cos * self.repeat.x,
            sin * self.repeat.x,
            0.0,
            0.0,
            -sin * self.repeat.y,
            cos * self.repeat.y,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
            self.offset.x,
            self.offset.y,
            0.0,
            1.0,
        ]);
        rot_scale
    }
}

/// A material texture slot: an optional [`TextureRef`] plus per-slot
/// sampling parameters.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    source: Option<TextureRef>,
    /// Intensity multiplier applied to the sample (`.y` of the info uniform).
    pub level: f32,
    /// UV set index (`.x` of the info uniform).
    pub uv_set: u32,
    pub transform: TextureTransform,
}

impl Default for TextureSlot {
    fn default() -> Self {
        Self {
            source: None,
            level: 1.0,
            uv_set: 0,
            transform: TextureTransform::default(),
        }
    }
}

impl TextureSlot {
    #[inline]
    #[must_use]
    pub fn is_some(&self) -> bool {
        self.source.is_some()
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<&TextureRef> {
        self.source.as_ref()
    }

    pub(crate) fn set(&mut self, texture: Option<TextureRef>) {
        self.source = texture;
    }

    /// Info uniform value: `(uv_set, level)`.
    #[must_use]
    pub fn info(&self) -> Vec2 {
        Vec2::new(self.uv_set as f32, self.level)
    }

    /// Bump slots carry a third component, the normal scale.
    #[must_use]
    pub fn bump_info(&self, bump_scale: f32) -> Vec3 {
        Vec3::new(self.uv_set as f32, 1.0 / self.level.max(f32::EPSILON), bump_scale)
    }
}
