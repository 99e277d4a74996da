pub mod flags;
pub mod runtime;
pub mod shader_manager;
pub mod uniform_layout;
pub mod variant;

pub use flags::{FeatureFlags, FlagResolver, Resolution};
pub use runtime::{BoundUniforms, FrameContext, FrameUniforms, MaterialRuntime};
pub use shader_manager::{get_env, LocationAllocator, ShaderGenerator};
pub use uniform_layout::{UniformBlock, UniformLayout};
pub use variant::{
    CompileError, ProgramBackend, ProgramDescriptor, ProgramHandle, Variant, VariantCache,
    FALLBACK_LADDER,
};
