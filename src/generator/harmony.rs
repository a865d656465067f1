// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Random chords and intervals stacked on a drawn base note.

use rand::Rng;
use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::music::{alteration, Alteration, Clef, ClefMapper, MidiNote, Note, NoteType};

use super::{ClefSelector, NoteGenerator};

/// Semitones of the third and fifth, by chord quality
/// (major, minor, diminished, augmented)
const CHORD_INTERVALS: [[u8; 2]; 4] = [[4, 7], [3, 7], [3, 6], [4, 8]];

/// Semitones of the major/perfect interval for each scale degree (index = degree)
const INTERVAL_SEMITONES: [u8; 9] = [0, 1, 2, 4, 5, 7, 9, 11, 12];

/// Quality offsets drawn for seconds, thirds, sixths and sevenths
const IMPERFECT_QUALITIES: [i8; 4] = [-2, -1, 0, 1];

/// Quality offsets drawn for fourths, fifths and octaves
const PERFECT_QUALITIES: [i8; 3] = [-2, 0, 1];

/// Horizontal shift of the upper note of a second, so both heads stay readable
const SECOND_XPOS_SHIFT: i32 = 20;

/// What to stack on the base note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Harmony {
    /// Root-position triad, major or minor
    Chord,
    /// A single interval of the given scale degree (2 = second .. 8 = octave)
    Interval(u8),
}

impl NoteGenerator {
    /// Append a random whole-note chord or interval to `seq`.
    ///
    /// Returns the drawn quality code: for chords an index into the chord
    /// table (0 major, 1 minor), for intervals the semitone offset applied
    /// to the degree's major or perfect size.
    pub fn random_chord_or_interval(
        &mut self,
        seq: &mut Vec<Note>,
        xpos: i32,
        harmony: Harmony,
    ) -> Result<i8> {
        let quality: i8 = match harmony {
            Harmony::Chord => self.rng.gen_range(0..2),
            Harmony::Interval(degree) => {
                if !(1..=8).contains(&degree) {
                    return Err(GeneratorError::InvalidConfiguration(format!(
                        "interval degree {} out of range",
                        degree
                    )));
                }
                if matches!(degree, 4 | 5 | 8) {
                    PERFECT_QUALITIES[self.rng.gen_range(0..PERFECT_QUALITIES.len())]
                } else {
                    IMPERFECT_QUALITIES[self.rng.gen_range(0..IMPERFECT_QUALITIES.len())]
                }
            }
        };

        let base = self
            .random_note(Some(NoteType::Whole), false, ClefSelector::Any)?
            .with_xpos(xpos);
        debug!("chord/interval quality {} on base pitch {}", quality, base.pitch);

        let voices = match harmony {
            Harmony::Chord => 2,
            Harmony::Interval(_) => 1,
        };

        let mut added = Vec::with_capacity(voices);
        let mut xpos = xpos;
        for voice in 0..voices {
            let (target, level) = match harmony {
                Harmony::Chord => (
                    base.pitch as i16 + CHORD_INTERVALS[quality as usize][voice] as i16,
                    base.level - 2 * (voice as i32 + 1),
                ),
                Harmony::Interval(degree) => (
                    base.pitch as i16 + INTERVAL_SEMITONES[degree as usize] as i16 + quality as i16,
                    base.level - degree as i32 + 1,
                ),
            };

            let alteration = self.reconcile(base.clef, level, target)?;

            if harmony == Harmony::Interval(2) {
                xpos -= SECOND_XPOS_SHIFT;
            }
            added.push(
                Note::new(
                    base.clef,
                    level,
                    target as MidiNote,
                    NoteType::Whole,
                    base.secondary_row,
                    alteration,
                )
                .with_xpos(xpos),
            );
        }

        seq.push(base);
        seq.extend(added);
        Ok(quality)
    }

    /// Accidental needed to sound `target` at `level`, given the key signature.
    ///
    /// When the signature already alters the step and the target cancels
    /// it exactly, a natural is shown; otherwise the signature offset is
    /// folded into the displayed accidental.
    fn reconcile(&self, clef: Clef, level: i32, target: i16) -> Result<Alteration> {
        let table = &self.state.table;
        let natural = ClefMapper::new(table).pitch_from_level(clef, level)?;
        let index = table
            .natural_index(natural)
            .ok_or(GeneratorError::PitchNotFound(natural))?;

        let on_clef = table.altered()[index] as i16 - table.natural()[index] as i16;
        let mut alt = target - table.altered()[index] as i16;

        debug!("reconcile before: alt {}, on clef {}", alt, on_clef);
        if alt != 0 && on_clef != 0 {
            if alt + on_clef == 0 {
                alt = alteration::NATURAL as i16;
            } else {
                alt += on_clef;
            }
        }
        debug!("reconcile after: target {}, level {}, alt {}", target, level, alt);

        Ok(alt as Alteration)
    }
}
