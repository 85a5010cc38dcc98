// src/lib.rs

pub mod attributes;
pub mod color;
pub mod config;
pub mod geometry;
pub mod scene;
pub mod timer;
