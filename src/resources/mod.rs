pub mod material;
pub mod shader_defines;
pub mod texture;

pub use material::{
    CullMode, DebugMode, DirtyCategories, OutlineColorMode, OutlineWidthMode, SideOrientation,
    ToonMaterial, TransparencyMode, MAX_SIMULTANEOUS_LIGHTS,
};
pub use shader_defines::ShaderDefines;
pub use texture::{TextureRef, TextureSlot, TextureTransform};
