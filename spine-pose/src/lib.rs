//! Pose evaluation for Spine 3.8 skeletal animation data (unofficial).
//!
//! The crate takes an in-memory [`SkeletonData`] and produces posed bones, slots and draw order.
//! Loading exported files and rendering live in other crates.

#![forbid(unsafe_code)]

mod error;
mod ids;
mod model;
mod runtime;
mod timeline;

pub use error::*;
pub use ids::next_vertex_attachment_id;
pub use model::*;
pub use runtime::*;
pub use timeline::*;

#[cfg(test)]
mod timeline_tests;
