// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note value produced by the generator and consumed by the staff renderer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::clef::Clef;
use super::MidiNote;

/// Staff level at which every silence is drawn
pub const SILENCE_LEVEL: i32 = 10;

/// Pitch carried by a silence (the treble middle line)
pub const SILENCE_PITCH: MidiNote = 71;

/// Accidental displayed next to a notehead, independent of the key signature.
///
/// Plain values are semitone offsets (-1 flat, 1 sharp); cumulative
/// reconciliation against a key signature may produce other offsets.
/// [`alteration::NATURAL`] asks the renderer for a natural sign.
pub type Alteration = i8;

pub mod alteration {
    use super::Alteration;

    pub const FLAT: Alteration = -1;
    pub const NONE: Alteration = 0;
    pub const SHARP: Alteration = 1;
    pub const NATURAL: Alteration = 2;
}

/// Rhythmic value of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Whole,
    Half,
    Quarter,
    Eighth,
    Triplet,
    Silence,
    /// Three quarters of a whole note
    DottedHalf,
    /// Three eighths of a whole note
    DottedQuarter,
}

impl NoteType {
    /// Every type, in the order the generator lists enabled types
    pub const ALL: [NoteType; 8] = [
        NoteType::Whole,
        NoteType::Half,
        NoteType::Quarter,
        NoteType::Eighth,
        NoteType::Triplet,
        NoteType::DottedHalf,
        NoteType::DottedQuarter,
        NoteType::Silence,
    ];

    /// Duration in quarter-note beats.
    ///
    /// A silence has no duration of its own; sequence generation assigns
    /// one from another type.
    pub fn duration(self) -> f64 {
        match self {
            NoteType::Whole => 4.0,
            NoteType::Half => 2.0,
            NoteType::Quarter => 1.0,
            NoteType::Eighth => 0.5,
            NoteType::Triplet => 1.0 / 3.0,
            NoteType::Silence => 0.0,
            NoteType::DottedHalf => 3.0,
            NoteType::DottedQuarter => 1.5,
        }
    }

    pub fn is_dotted(self) -> bool {
        matches!(self, NoteType::DottedHalf | NoteType::DottedQuarter)
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoteType::Whole => "whole",
            NoteType::Half => "half",
            NoteType::Quarter => "quarter",
            NoteType::Eighth => "eighth",
            NoteType::Triplet => "triplet",
            NoteType::Silence => "silence",
            NoteType::DottedHalf => "dotted half",
            NoteType::DottedQuarter => "dotted quarter",
        };
        write!(f, "{}", name)
    }
}

/// A single note or silence placed on a staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Horizontal position hint for the renderer
    pub xpos: i32,
    pub clef: Clef,
    /// Staff position relative to the clef (0 = two octaves above its base)
    pub level: i32,
    pub pitch: MidiNote,
    pub note_type: NoteType,
    /// Duration in beats
    pub duration: f64,
    pub alteration: Alteration,
    /// True when the note belongs to the second configured range
    pub secondary_row: bool,
    /// Shared triplet tag; 0 when not part of a triplet
    pub triplet_value: i32,
    /// Beat offset within a generated sequence
    pub timestamp: f64,
}

impl Note {
    /// Build a note, deriving its duration from `note_type`.
    ///
    /// Silences are pinned to [`SILENCE_LEVEL`] and [`SILENCE_PITCH`]
    /// whatever level and pitch were passed in.
    pub fn new(
        clef: Clef,
        level: i32,
        pitch: MidiNote,
        note_type: NoteType,
        secondary_row: bool,
        alteration: Alteration,
    ) -> Self {
        let (level, pitch) = match note_type {
            NoteType::Silence => (SILENCE_LEVEL, SILENCE_PITCH),
            _ => (level, pitch),
        };

        Self {
            xpos: 0,
            clef,
            level,
            pitch,
            note_type,
            duration: note_type.duration(),
            alteration,
            secondary_row,
            triplet_value: 0,
            timestamp: 0.0,
        }
    }

    /// Set the horizontal position hint
    pub fn with_xpos(mut self, xpos: i32) -> Self {
        self.xpos = xpos;
        self
    }

    pub fn is_silence(&self) -> bool {
        self.note_type == NoteType::Silence
    }
}
