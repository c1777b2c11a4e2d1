//! Test helpers: in-memory images and scratch upload directories.
//!
//! Run from workspace root: `cargo test -p fotolog-processing`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;
