pub mod evaluator;
pub mod outline;

pub use evaluator::{
    FragmentContext, FragmentOutput, LightInput, SurfaceSamples, ToonShader,
};
pub use outline::{OutlinePassController, PassKind, PassState};
