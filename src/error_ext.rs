use crate::error::{LiveroomError, Result};

/// Attach a human-readable message to a failure before it reaches a toast.
pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> Result<T>;
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<LiveroomError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.with_context(|| msg.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LiveroomError::Context {
            message: f(),
            source: Box::new(e.into()),
        })
    }
}
