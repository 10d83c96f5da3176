//! Filesystem services around the pipeline

pub mod io;

pub use io::{OutputWriter, TempUpload};
