pub mod curve;
pub mod surface;

pub use surface::Surface;
