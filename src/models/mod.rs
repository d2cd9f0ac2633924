// src/models/mod.rs

//! Domain models for the catalogue data.
//!
//! Both entities are transient: built from an API payload at fetch time
//! and dropped once the caller is done with them.

mod blog;
mod course;

pub use blog::BlogPost;
pub use course::Course;
