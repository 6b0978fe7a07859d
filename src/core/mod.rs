//! Core types shared by every module: the error enum and its CLI presentation.

pub mod error;

pub use error::{ErrorContext, Result, TemplatizeError, user_friendly_error};
