//! Particle overlays: the generic field engine, the rain and snow kinds, and
//! the driver that runs a field on a surface.

pub mod driver;
pub mod field;
pub mod frames;
pub mod rain;
pub mod snow;
pub mod surface;

pub use driver::{AnimationDriver, DriverPhase, Viewport};
pub use field::{ParticleField, ParticleKind};
pub use frames::{FrameQueue, FrameScheduler, FrameToken};
pub use rain::{Rain, RainField};
pub use snow::{Snow, SnowField};
pub use surface::{DrawingSurface, RecordingSurface};
