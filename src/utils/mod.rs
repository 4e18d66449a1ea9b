//! # Utilities Module
//!
//! Small geometry helpers shared by the creep engine, spawn policy and
//! scripted sequences.

pub mod math;

pub use math::*;
