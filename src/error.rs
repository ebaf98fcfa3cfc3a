/// Broad category of a [`ShapeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter slice did not hold exactly five values.
    ParamCount,
    /// A fit configuration is inconsistent (range, limits or guesses).
    InvalidConfig,
    /// Binned data is empty or its columns disagree in length.
    InvalidHistogram,
    /// Synthetic sample settings cannot produce a histogram.
    InvalidSample,
}

#[derive(Clone)]
pub struct ShapeError {
    kind: ErrorKind,
    message: String,
}

impl ShapeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for ShapeError {}
