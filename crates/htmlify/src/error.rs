//! CLI error types.

use std::path::PathBuf;

use htmlify_core::HtmlifyError;

/// Exit code for unusable command line parameters.
pub(crate) const EXIT_INVALID_PARAMETER: i32 = 1;
/// Exit code for files that cannot be read or written.
pub(crate) const EXIT_FILE_ERROR: i32 = 2;
/// Exit code for input that cannot be converted.
pub(crate) const EXIT_CONVERSION_FAILED: i32 = 3;

/// CLI error type. Every variant aborts the batch.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Parameter(String),

    #[error("file \"{}\" was specified more than once", .0.display())]
    DuplicateFile(PathBuf),

    #[error("file \"{}\" does not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("{0}")]
    Config(#[from] HtmlifyError),

    #[error("could not read \"{}\": {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("\"{}\" is {size} bytes, the limit is {limit} bytes", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("could not write \"{}\": {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("conversion of \"{}\" from UTF-8 failed: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("could not convert \"{}\": {source}", path.display())]
    Render {
        path: PathBuf,
        source: HtmlifyError,
    },
}

impl CliError {
    /// Process exit code reported for this error.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Parameter(_) | Self::DuplicateFile(_) | Self::MissingFile(_) | Self::Config(_) => {
                EXIT_INVALID_PARAMETER
            }
            Self::Read { .. } | Self::TooLarge { .. } | Self::Write { .. } => EXIT_FILE_ERROR,
            Self::Decode { .. } | Self::Render { .. } => EXIT_CONVERSION_FAILED,
        }
    }
}
