//! From a composed graph to compiler flags.
//!
//! Surface propagation, toolchain flag rendering, the configure plan and
//! the configure stamp.

pub mod fingerprint;
pub mod plan;
pub mod surface_resolver;
pub mod toolchain;

pub use fingerprint::{ConfigureStamp, StaleTarget};
pub use plan::ConfigurePlan;
pub use surface_resolver::{resolve_compile_surface, EffectiveCompileSurface};
pub use toolchain::{detect_toolchain, CommandSpec, GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};
