//! Integration test suite for solution-templatize
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: the `solution-templatize` binary end to end
//! - **dashboard**: dashboard conversion and reference tracking
//! - **round_trip**: templatize then resolve back to the original
//! - **webapp**: web application conversion

mod cli;
mod dashboard;
mod round_trip;
mod webapp;
