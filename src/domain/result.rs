//! Result type alias for Cloak

use super::errors::CloakError;

/// Result type alias for Cloak operations
///
/// # Examples
///
/// ```
/// use cloak::domain::result::Result;
/// use cloak::domain::errors::CloakError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CloakError::InvalidInput("span out of bounds".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CloakError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CloakError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(CloakError::Detection("test error".to_string()));
        assert!(result.is_err());
    }

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
