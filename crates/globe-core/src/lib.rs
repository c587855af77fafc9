//! Platform-free globe engine.
//!
//! Projection of trip locations onto a sphere, the per-frame animation state,
//! pointer picking and the info-card state machine. Nothing in this crate
//! touches a GPU, DOM or window; front-ends feed it ticks and input events and
//! draw the [`render_loop::FrameOutput`] it produces.

pub mod app;
pub mod camera;
pub mod constants;
pub mod error;
pub mod geo;
pub mod location;
pub mod marker;
pub mod orbit;
pub mod overlay;
pub mod pointer;
pub mod render_loop;
pub mod responsive;
pub mod scene;
pub mod timer;

pub use app::GlobeApp;
pub use error::GlobeError;
pub use geo::GeoPoint;
pub use location::Location;
