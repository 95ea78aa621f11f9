#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompressError {
    /// A pixel or block buffer does not have the size required by the image
    /// dimensions and method.
    ///
    /// Image functions require the buffer size to be exact. No more, no less.
    UnexpectedBufferSize { expected: usize, actual: usize },
    /// The image is so large that its size in bytes cannot be represented
    /// as `usize`.
    DataLayoutTooBig,
}
impl std::fmt::Display for CompressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressError::UnexpectedBufferSize { expected, actual } => {
                write!(
                    f,
                    "Unexpected buffer size: expected {} bytes but got {} bytes",
                    expected, actual
                )
            }
            CompressError::DataLayoutTooBig => {
                write!(f, "The image is too large to be addressed in memory")
            }
        }
    }
}
impl std::error::Error for CompressError {}
