//! Stratus Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Stratus layout
//! engines and their consumers:
//!
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Model**: Services, connections, groups, and their positioned forms ([`model`] module)

pub mod geometry;
pub mod model;
