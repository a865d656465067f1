// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error type shared by the pitch tables, ranges and generator.

use thiserror::Error;

use crate::music::MidiNote;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("index {index} out of range for table of {len} entries")]
    IndexOutOfRange { index: i32, len: usize },
    #[error("pitch {0} not found in pitch table")]
    PitchNotFound(MidiNote),
    #[error("no notes available in the requested range")]
    EmptyRange,
    #[error("generation failed after {attempts} rejected draws")]
    GenerationFailed { attempts: usize },
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
