// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for Calao.
//!
//! This module provides the note model, clefs and the key-signature aware
//! pitch tables the generator draws from.

pub mod clef;
pub mod note;
pub mod pitch_table;

pub use clef::{Clef, ClefMapper, ClefMask};
pub use note::{alteration, Alteration, Note, NoteType};
pub use pitch_table::{KeySignature, PitchTable, SignatureKind};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Semitone offset type
pub type Semitones = i8;
