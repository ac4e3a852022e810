//! Error conversion helpers
//!
//! Attach an action and a path to any foreign error while lifting it into
//! `ApplicationError::OperationFailed`.

use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

pub trait ResultExt<T> {
    /// Add path context to an error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&seed)
    ///     .with_path_context("read seed file", &seed)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
