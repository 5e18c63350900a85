pub mod clip;
pub mod idw;

pub use clip::clip_to_boundary;
pub use idw::interpolate;
