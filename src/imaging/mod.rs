//! Image preparation: decode, probe, resize.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with content-sniffed format |
//! | **Transparency probe** | sampled alpha scan of the top-left region |
//! | **Resize** | `resize_exact` with nearest-neighbour filtering |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, LoadedImage, format_name};
pub use calculations::fit_dimensions;
pub use operations::{
    PreparedImage, ResizeRequest, decode_image, has_transparency, resize_image,
};
pub use rust_backend::RustBackend;
