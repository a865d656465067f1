// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Natural and key-signature-altered pitch tables.
//!
//! Both tables cover six octaves of the diatonic scale starting at C0
//! (MIDI 24). Index `i` always names the same staff line or space in both
//! tables; a key signature only changes the sounding pitch stored there.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};

use super::{MidiNote, Semitones};

/// Pitch of the first table entry (C0)
pub const BASE_PITCH: MidiNote = 24;

/// Number of octaves covered by the tables
pub const OCTAVES: usize = 6;

/// Number of entries in each table
pub const TABLE_LEN: usize = OCTAVES * 7;

/// Semitone offsets of C D E F G A B from the octave's first note
pub const DIATONIC_OFFSETS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Raised steps for 0..=7 sharps (F C G D A E B order of introduction)
const SHARPS_MATRIX: [[u8; 7]; 8] = [
    [0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 0, 0],
    [1, 0, 0, 1, 0, 0, 0],
    [1, 0, 0, 1, 1, 0, 0],
    [1, 1, 0, 1, 1, 0, 0],
    [1, 1, 0, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 1],
];

/// Lowered steps for 0..=7 flats (B E A D G C F order of introduction)
const FLATS_MATRIX: [[u8; 7]; 8] = [
    [0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 1],
    [0, 0, 1, 0, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [1, 1, 1, 0, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1],
];

/// Kind of accidentals carried by a key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    #[default]
    None,
    Sharps,
    Flats,
}

/// A key signature: a kind plus a number of accidentals (0..=7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawKeySignature")]
pub struct KeySignature {
    kind: SignatureKind,
    count: u8,
}

/// Unchecked form read from configuration files
#[derive(Deserialize)]
struct RawKeySignature {
    #[serde(default)]
    kind: SignatureKind,
    #[serde(default)]
    count: u8,
}

impl TryFrom<RawKeySignature> for KeySignature {
    type Error = GeneratorError;

    fn try_from(raw: RawKeySignature) -> Result<Self> {
        Self::new(raw.kind, raw.count)
    }
}

impl KeySignature {
    /// Create a key signature, rejecting more than seven accidentals
    pub fn new(kind: SignatureKind, count: u8) -> Result<Self> {
        if count > 7 {
            return Err(GeneratorError::InvalidConfiguration(format!(
                "key signature cannot carry {} accidentals",
                count
            )));
        }
        let kind = if count == 0 { SignatureKind::None } else { kind };
        let count = if kind == SignatureKind::None { 0 } else { count };
        Ok(Self { kind, count })
    }

    /// Decode the preference index: 0 none, 1-7 sharps, 8-14 flats
    pub fn from_index(index: i64) -> Result<Self> {
        match index {
            i if i <= 0 => Ok(Self::default()),
            1..=7 => Self::new(SignatureKind::Sharps, index as u8),
            8..=14 => Self::new(SignatureKind::Flats, (index - 7) as u8),
            _ => Err(GeneratorError::InvalidConfiguration(format!(
                "accidentals index {} out of range",
                index
            ))),
        }
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Semitone alteration applied to diatonic step `step` (0 = C .. 6 = B)
    pub fn offset(&self, step: usize) -> Semitones {
        let step = step % 7;
        let row = self.count as usize;
        match self.kind {
            SignatureKind::None => 0,
            SignatureKind::Sharps => SHARPS_MATRIX[row][step] as Semitones,
            SignatureKind::Flats => -(FLATS_MATRIX[row][step] as Semitones),
        }
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SignatureKind::None => write!(f, "no accidentals"),
            SignatureKind::Sharps => write!(f, "{} sharp(s)", self.count),
            SignatureKind::Flats => write!(f, "{} flat(s)", self.count),
        }
    }
}

/// Parallel natural and altered pitch sequences
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTable {
    signature: KeySignature,
    natural: Vec<MidiNote>,
    altered: Vec<MidiNote>,
}

impl PitchTable {
    /// Build both tables for the given key signature
    pub fn build(signature: KeySignature) -> Self {
        let mut natural = Vec::with_capacity(TABLE_LEN);
        let mut altered = Vec::with_capacity(TABLE_LEN);

        for octave in 0..OCTAVES {
            let octave_pitch = BASE_PITCH + (octave as u8) * 12;
            for (step, offset) in DIATONIC_OFFSETS.iter().enumerate() {
                let pitch = octave_pitch + offset;
                natural.push(pitch);
                altered.push((pitch as i16 + signature.offset(step) as i16) as MidiNote);
            }
        }

        Self {
            signature,
            natural,
            altered,
        }
    }

    pub fn signature(&self) -> KeySignature {
        self.signature
    }

    pub fn natural(&self) -> &[MidiNote] {
        &self.natural
    }

    pub fn altered(&self) -> &[MidiNote] {
        &self.altered
    }

    pub fn len(&self) -> usize {
        self.natural.len()
    }

    pub fn is_empty(&self) -> bool {
        self.natural.is_empty()
    }

    /// Table index of a natural pitch
    pub fn natural_index(&self, pitch: MidiNote) -> Option<usize> {
        self.natural.iter().position(|&p| p == pitch)
    }

    /// Table index of an altered pitch
    pub fn altered_index(&self, pitch: MidiNote) -> Option<usize> {
        self.altered.iter().position(|&p| p == pitch)
    }

    /// Natural pitch `level` steps above `reference` (negative steps go down)
    pub fn pitch_at_level(&self, reference: MidiNote, level: i32) -> Result<MidiNote> {
        let start = self
            .natural_index(reference)
            .ok_or(GeneratorError::PitchNotFound(reference))?;
        let index = start as i32 + level;
        if index < 0 || index as usize >= self.natural.len() {
            return Err(GeneratorError::IndexOutOfRange {
                index,
                len: self.natural.len(),
            });
        }
        Ok(self.natural[index as usize])
    }

    /// Steps from `reference` up to the first entry sounding `pitch`
    pub fn find_level(&self, reference: MidiNote, pitch: MidiNote, use_altered: bool) -> Option<i32> {
        let start = self.natural_index(reference)?;
        let table = if use_altered { &self.altered } else { &self.natural };
        table[start..]
            .iter()
            .position(|&p| p == pitch)
            .map(|offset| offset as i32)
    }

    /// Like [`find_level`](Self::find_level), but a miss yields level 0
    pub fn level_from_pitch(&self, reference: MidiNote, pitch: MidiNote, use_altered: bool) -> i32 {
        self.find_level(reference, pitch, use_altered).unwrap_or(0)
    }

    /// Alteration the key signature implies at an altered pitch (0 if absent)
    pub fn alteration_offset(&self, pitch: MidiNote) -> Semitones {
        match self.altered_index(pitch) {
            Some(i) => (self.altered[i] as i16 - self.natural[i] as i16) as Semitones,
            None => 0,
        }
    }

    /// Altered counterpart of a natural pitch
    pub fn altered_from_natural(&self, pitch: MidiNote) -> Option<MidiNote> {
        self.natural_index(pitch).map(|i| self.altered[i])
    }
}

impl Default for PitchTable {
    fn default() -> Self {
        Self::build(KeySignature::default())
    }
}
