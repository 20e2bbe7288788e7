//! Error types for the math typesetting crate

use thiserror::Error;

/// Errors that can occur while loading font math data or laying out a formula
#[derive(Error, Debug)]
pub enum MathError {
    /// Math table data is structurally invalid
    #[error("Math table error: {0}")]
    MathTable(String),

    /// Math table JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The font service failed to provide a font
    #[error("Font load error: {0}")]
    FontLoad(String),

    /// A computed box broke a geometric or range invariant.
    ///
    /// This is an internal-consistency failure: the layout pass is aborted
    /// instead of returning a wrong box.
    #[error("Layout invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for math operations
pub type MathResult<T> = Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::MathTable("units_per_em must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Math table error: units_per_em must be positive"
        );

        let err = MathError::InvariantViolation("negative ascent".to_string());
        assert_eq!(err.to_string(), "Layout invariant violated: negative ascent");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let math_err: MathError = json_err.into();
        assert!(matches!(math_err, MathError::Json(_)));
    }
}
