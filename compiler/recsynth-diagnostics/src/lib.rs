/// Abort with an internal compiler error.
///
/// This is reserved for states the engine can never reach when it is working correctly. The
/// message carries the source location of the macro invocation.
#[macro_export]
macro_rules! ice {
    ($message:expr) => {{
        let message = $message;
        let file = file!();
        let line = line!();
        let column = column!();
        panic!(
            "internal compiler error ({}:{}:{}):\n{}",
            file, line, column, message
        )
    }};
}

/// Report a broken engine invariant.
///
/// Debug builds abort exactly like [`ice!`]. Release builds log the violation at error level and
/// carry on, so the caller must be prepared to continue with a degraded result.
#[macro_export]
macro_rules! debug_ice {
    ($message:expr) => {{
        let message = $message;
        if cfg!(debug_assertions) {
            $crate::ice!(message);
        } else {
            $crate::__private::error!(
                file = file!(),
                line = line!(),
                "internal compiler error: {}",
                message
            );
        }
    }};
}

#[doc(hidden)]
pub mod __private {
    pub use tracing::error;
}
