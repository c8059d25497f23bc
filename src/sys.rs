//! Host-facing vocabulary: geometry, window attributes, the host capability
//! interface, and an in-memory host.

pub mod geometry;
pub mod headless;
pub mod host;
pub mod window;
