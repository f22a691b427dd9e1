//! Converts the input files one after another.

use std::path::{Path, PathBuf};

use htmlify_core::{Options, PipelineConfig};

use crate::error::CliError;
use crate::io::{self, Encoding};

/// A resolved pipeline plus the input decoding, shared by all files.
pub(crate) struct Batch {
    pipeline: PipelineConfig,
    encoding: Encoding,
}

impl Batch {
    /// Resolves the pipeline. Configuration errors surface before any file is read.
    pub(crate) fn new(options: &Options, encoding: Encoding) -> Result<Self, CliError> {
        let pipeline = PipelineConfig::resolve(options)?;
        Ok(Self { pipeline, encoding })
    }

    /// Converts every input in order, stopping at the first error.
    pub(crate) fn run(&self, inputs: &[PathBuf]) -> Result<(), CliError> {
        for input in inputs {
            let output = self.convert_file(input)?;
            tracing::info!(
                input = %input.display(),
                output = %output.display(),
                "processed file"
            );
        }
        Ok(())
    }

    /// Converts one file and returns the path written.
    pub(crate) fn convert_file(&self, input: &Path) -> Result<PathBuf, CliError> {
        let bytes = io::read_input(input)?;
        tracing::debug!(input = %input.display(), bytes = bytes.len(), "read input");

        let text = io::decode(&bytes, self.encoding).map_err(|reason| CliError::Decode {
            path: input.to_path_buf(),
            reason,
        })?;
        let html = self
            .pipeline
            .process(&text)
            .map_err(|source| CliError::Render {
                path: input.to_path_buf(),
                source,
            })?;

        let output = io::output_path(input);
        io::write_output(&output, &io::encode_latin1(&html))?;
        Ok(output)
    }
}
