//! Classmap Core Types and Definitions
//!
//! This crate provides the foundational types shared by every classmap
//! crate. It includes:
//!
//! - **Names**: Fully-qualified type names ([`fqn::Fqn`])
//! - **Declarations**: The type declaration model produced by the parser and
//!   consumed by the index ([`declaration`] module)

pub mod declaration;
pub mod fqn;
