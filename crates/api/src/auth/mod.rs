//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and generation for tooling
//!   and tests). Sign-in itself happens in the external identity provider.

pub mod jwt;
