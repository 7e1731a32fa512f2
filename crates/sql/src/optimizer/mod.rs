//! Expression-level optimization passes.
//!
//! # Rules
//!
//! - `RewriteSet`: Replaces operations HeavyDB cannot spell (floor division, boolean
//!   reductions) with equivalent supported trees before translation.

pub mod rewrites;

pub use rewrites::{RewriteRule, RewriteSet};
