/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the utils module

use thiserror::Error;

/// Errors that can occur in the utils module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UtilsError {
    /// The objective function returned NaN or infinity
    #[error("Objective function is not finite at x = {x}: {value}")]
    NonFiniteObjective { x: f64, value: f64 },

    /// The root finder was given an interval whose ends do not straddle zero
    #[error("Root is not bracketed: f({lower}) = {f_lower}, f({upper}) = {f_upper}")]
    NotBracketed {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },
}

/// A specialized Result type for utils operations
pub type Result<T> = std::result::Result<T, UtilsError>;
