#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod pipeline;
pub mod resources;
pub mod scene;
pub mod shading;
pub mod utils;

pub use errors::{Result, SumiError};
pub use pipeline::flags::{FeatureFlags, FlagResolver, Resolution};
pub use pipeline::runtime::{FrameContext, MaterialRuntime};
pub use pipeline::uniform_layout::{UniformBlock, UniformLayout};
pub use pipeline::variant::{
    CompileError, ProgramBackend, ProgramDescriptor, ProgramHandle, Variant, VariantCache,
};
pub use resources::material::{
    CullMode, DebugMode, DirtyCategories, OutlineColorMode, OutlineWidthMode, SideOrientation,
    ToonMaterial,
};
pub use resources::shader_defines::ShaderDefines;
pub use resources::texture::{TextureRef, TextureSlot};
pub use scene::camera::CameraState;
pub use scene::light::{Light, LightKind};
pub use scene::{MeshCaps, SceneCaps};
pub use shading::evaluator::{FragmentContext, FragmentOutput, LightInput, SurfaceSamples, ToonShader};
pub use shading::outline::{OutlinePassController, PassKind, PassState};
pub use utils::interner;
