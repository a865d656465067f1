// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Clefs and the conversion between staff levels and pitches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::pitch_table::PitchTable;
use super::MidiNote;

/// Level offset placing level 0 two octaves above a clef's base pitch
pub const LEVEL_CENTER: i32 = 24;

/// Table steps from a clef's base pitch to its rhythm notehead position
const RHYTHM_STEPS: i32 = 12;

/// Pitch used for rhythm noteheads when no clef mapping applies
pub const DEFAULT_RHYTHM_PITCH: MidiNote = 71;

/// Supported clefs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clef {
    /// G clef on the second line
    Treble,
    /// F clef on the fourth line
    Bass,
    /// C clef on the third line
    Alto,
    /// C clef on the fourth line
    Tenor,
}

impl Clef {
    /// All clefs, in the order ranges are registered
    pub const ALL: [Clef; 4] = [Clef::Treble, Clef::Bass, Clef::Alto, Clef::Tenor];

    /// Natural pitch of the lowest reference position of the clef
    pub fn base_pitch(self) -> MidiNote {
        match self {
            Clef::Treble => 50,
            Clef::Bass => 29,
            Clef::Alto => 40,
            Clef::Tenor => 36,
        }
    }

    /// Default (lower, upper) natural pitch bounds of the playable range
    pub fn default_bounds(self) -> (MidiNote, MidiNote) {
        match self {
            Clef::Treble => (64, 77),
            Clef::Bass => (43, 57),
            Clef::Alto => (53, 67),
            Clef::Tenor => (50, 64),
        }
    }

    /// Bit used for this clef in a [`ClefMask`]
    pub fn bit(self) -> u8 {
        match self {
            Clef::Treble => 1,
            Clef::Bass => 2,
            Clef::Alto => 4,
            Clef::Tenor => 8,
        }
    }

    /// Preference key prefix (`clef_g2`, `clef_f4`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Clef::Treble => "clef_g2",
            Clef::Bass => "clef_f4",
            Clef::Alto => "clef_c3",
            Clef::Tenor => "clef_c4",
        }
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Clef::Treble => "treble",
            Clef::Bass => "bass",
            Clef::Alto => "alto",
            Clef::Tenor => "tenor",
        };
        write!(f, "{}", name)
    }
}

/// Set of enabled clefs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct ClefMask(u8);

impl ClefMask {
    pub const TREBLE: ClefMask = ClefMask(1);

    /// Build a mask from raw bits; -1 (unset) and empty masks mean treble only
    pub fn from_bits(bits: i64) -> Self {
        let bits = (bits.max(0) as u8) & 0x0f;
        if bits == 0 {
            Self::TREBLE
        } else {
            ClefMask(bits)
        }
    }

    pub fn from_clefs(clefs: &[Clef]) -> Self {
        Self::from_bits(clefs.iter().fold(0, |acc, c| acc | c.bit()) as i64)
    }

    pub fn only(clef: Clef) -> Self {
        ClefMask(clef.bit())
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, clef: Clef) -> bool {
        self.0 & clef.bit() != 0
    }

    /// Enabled clefs in registration order
    pub fn clefs(self) -> impl Iterator<Item = Clef> {
        Clef::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    pub fn count(self) -> usize {
        self.clefs().count()
    }
}

impl From<i64> for ClefMask {
    fn from(bits: i64) -> Self {
        Self::from_bits(bits)
    }
}

impl From<ClefMask> for i64 {
    fn from(mask: ClefMask) -> Self {
        mask.0 as i64
    }
}

impl Default for ClefMask {
    fn default() -> Self {
        Self::TREBLE
    }
}

/// Converts between clef levels and pitches using a pitch table
#[derive(Debug, Clone, Copy)]
pub struct ClefMapper<'a> {
    table: &'a PitchTable,
}

impl<'a> ClefMapper<'a> {
    pub fn new(table: &'a PitchTable) -> Self {
        Self { table }
    }

    /// Level of an altered pitch on `clef`; a pitch missing from the table maps to level 24
    pub fn level_from_pitch(&self, clef: Clef, pitch: MidiNote) -> i32 {
        LEVEL_CENTER - self.table.level_from_pitch(clef.base_pitch(), pitch, true)
    }

    /// Level of an altered pitch, or `None` when the table does not hold it
    pub fn find_level(&self, clef: Clef, pitch: MidiNote) -> Option<i32> {
        self.table
            .find_level(clef.base_pitch(), pitch, true)
            .map(|steps| LEVEL_CENTER - steps)
    }

    /// Natural pitch drawn at `level` on `clef`
    pub fn pitch_from_level(&self, clef: Clef, level: i32) -> Result<MidiNote> {
        self.table
            .pitch_at_level(clef.base_pitch(), LEVEL_CENTER - level)
    }

    /// Fixed notehead pitch for pure-rhythm exercises
    pub fn rhythm_reference_pitch(&self, clef: Clef) -> MidiNote {
        self.table
            .pitch_at_level(clef.base_pitch(), RHYTHM_STEPS)
            .unwrap_or(DEFAULT_RHYTHM_PITCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::pitch_table::{KeySignature, SignatureKind};

    #[test]
    fn test_round_trip_default_ranges() {
        let table = PitchTable::default();
        let mapper = ClefMapper::new(&table);
        for clef in Clef::ALL {
            let (low, high) = clef.default_bounds();
            for &pitch in table.natural().iter().filter(|&&p| p >= low && p <= high) {
                let level = mapper.level_from_pitch(clef, pitch);
                assert_eq!(mapper.pitch_from_level(clef, level).unwrap(), pitch);
            }
        }
    }

    #[test]
    fn test_treble_levels() {
        let table = PitchTable::default();
        let mapper = ClefMapper::new(&table);
        // B4 sits on the middle line, level 12
        assert_eq!(mapper.level_from_pitch(Clef::Treble, 71), 12);
        assert_eq!(mapper.level_from_pitch(Clef::Treble, 72), 11);
        assert_eq!(mapper.pitch_from_level(Clef::Treble, 24).unwrap(), 50);
    }

    #[test]
    fn test_sharp_signature_levels() {
        let sig = KeySignature::new(SignatureKind::Sharps, 1).unwrap();
        let table = PitchTable::build(sig);
        let mapper = ClefMapper::new(&table);

        // F#4 takes the F line
        let level = mapper.level_from_pitch(Clef::Treble, 66);
        assert_eq!(level, 24 - 9);
        assert_eq!(mapper.pitch_from_level(Clef::Treble, level).unwrap(), 65);

        // F natural is absent from the altered table
        assert_eq!(mapper.find_level(Clef::Treble, 65), None);
        assert_eq!(mapper.level_from_pitch(Clef::Treble, 65), LEVEL_CENTER);
    }

    #[test]
    fn test_rhythm_reference_pitch() {
        let table = PitchTable::default();
        let mapper = ClefMapper::new(&table);
        assert_eq!(mapper.rhythm_reference_pitch(Clef::Treble), 71);
        assert_eq!(mapper.rhythm_reference_pitch(Clef::Bass), 50);
        assert_eq!(mapper.level_from_pitch(Clef::Treble, 71), 12);
        assert_eq!(mapper.level_from_pitch(Clef::Bass, 50), 12);
    }

    #[test]
    fn test_clef_mask() {
        assert_eq!(ClefMask::from_bits(-1), ClefMask::TREBLE);
        assert_eq!(ClefMask::from_bits(0), ClefMask::TREBLE);

        let mask = ClefMask::from_bits(3);
        assert!(mask.contains(Clef::Treble));
        assert!(mask.contains(Clef::Bass));
        assert!(!mask.contains(Clef::Alto));
        assert_eq!(mask.count(), 2);
        assert_eq!(mask.clefs().collect::<Vec<_>>(), vec![Clef::Treble, Clef::Bass]);

        let mask = ClefMask::from_clefs(&[Clef::Tenor, Clef::Alto]);
        assert_eq!(mask.bits(), 12);
        assert_eq!(ClefMask::only(Clef::Bass).bits(), 2);

        // only the four clef bits are read
        assert_eq!(ClefMask::from_bits(256), ClefMask::TREBLE);
        assert_eq!(ClefMask::from_bits(0x102), ClefMask::only(Clef::Bass));
        assert_eq!(ClefMask::from_bits(0xf4), ClefMask::only(Clef::Alto));
    }
}
