pub mod overlay;
pub mod run;
pub mod sdl;
pub mod surface;

pub use run::DisplayLoop;
pub use sdl::Sdl2Surface;
pub use surface::{RenderSurface, SurfaceEvent, ENTER_KEY};
