// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Calao - random note, chord and rhythm generation for ear-training and
//! sight-reading exercises.

pub mod config;
pub mod error;
pub mod generator;
pub mod music;

pub use config::{GenerationConfig, Preferences, TimeSignature};
pub use error::{GeneratorError, Result};
pub use generator::{rebuild, ClefSelector, GeneratorState, Harmony, NoteGenerator};
pub use music::{Clef, Note, NoteType};
