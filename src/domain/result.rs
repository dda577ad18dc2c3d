//! Result type alias for MedReport
//!
//! This module provides a convenient Result type alias that uses MedReportError
//! as the error type.

use super::errors::MedReportError;

/// Result type alias for MedReport operations
///
/// # Examples
///
/// ```
/// use medreport::domain::result::Result;
/// use medreport::domain::errors::MedReportError;
///
/// fn lookup() -> Result<u32> {
///     Err(MedReportError::NotFound("report".to_string()))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type Result<T> = std::result::Result<T, MedReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
