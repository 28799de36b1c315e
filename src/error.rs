/*
 * Error types for the toolkit. Only two severities exist: recoverable
 * `PlatformError`s that callers may propagate or log, and fatal precondition
 * violations that go through `fatal` and never return.
 */
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Class registration failed: {0}")]
    ClassRegistrationFailed(String),

    #[error("Window creation failed: {0}")]
    WindowCreationFailed(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Missing parent: {0}")]
    MissingParent(String),

    #[error("Unknown widget: {0}")]
    UnknownWidget(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::OperationFailed(format!("Win32 error: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/*
 * Reports a violated precondition and stops. The release and dev profiles
 * build with `panic = "abort"`, so outside of tests this terminates the process.
 */
#[track_caller]
pub fn fatal(err: PlatformError) -> ! {
    log::error!("Fatal: {err}");
    panic!("fatal precondition violation: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_context() {
        let err = PlatformError::MissingParent("widget 7".to_string());
        assert_eq!(err.to_string(), "Missing parent: widget 7");
    }

    #[test]
    #[should_panic(expected = "fatal precondition violation")]
    fn fatal_never_returns() {
        fatal(PlatformError::ClassRegistrationFailed("Frame".to_string()));
    }
}
