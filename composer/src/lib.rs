// This file makes `composer` into a rust library crate.

// The capture session and serializer are driven from here by embedding
// applications; `main.rs` wraps the same modules into a command line tool.

pub mod accumulator;
pub mod capture;
pub mod compose;
pub mod export_glb;
pub mod frame;
pub mod import_glb;
pub mod inspect;
pub mod mesh;
pub mod misc;
pub mod quality;
pub mod recording;
pub mod texturing;
pub mod uv;

#[cfg(test)]
mod test_util;

pub use base;
