// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Measure-accurate rhythmic sequences.
//!
//! Each measure is filled by rejection sampling: a drawn note is kept only
//! if it fits in the beats left in the measure, so no note straddles a bar
//! line. A triplet group always takes exactly one beat, and a measure never
//! mixes eighth notes with triplets. Once a measure holds a triplet, only
//! draws leaving a whole number of beats are kept, so a triplet can always
//! complete it.

use rand::Rng;
use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::music::{Note, NoteType};

use super::{ClefSelector, NoteGenerator};

/// Consecutive rejected draws tolerated before a measure is abandoned
pub const MAX_REJECTED_DRAWS: usize = 10_000;

/// Level of the middle staff line; triplets at or below it get stems up
pub const MIDDLE_LINE_LEVEL: i32 = 12;

/// Added to the group value of the two trailing notes of a triplet
pub const TRIPLET_COMPANION_TAG: i32 = 1000;

impl NoteGenerator {
    /// Generate `measures` full measures of notes.
    ///
    /// With `rhythm_only`, every note sits on the clef's rhythm position.
    pub fn random_sequence(
        &mut self,
        measures: usize,
        rhythm_only: bool,
        selector: ClefSelector,
    ) -> Result<Vec<Note>> {
        let mut seq = Vec::new();
        self.fill_random_sequence(&mut seq, measures, rhythm_only, selector)?;
        Ok(seq)
    }

    /// Clear `seq` and fill it with `measures` full measures
    pub fn fill_random_sequence(
        &mut self,
        seq: &mut Vec<Note>,
        measures: usize,
        rhythm_only: bool,
        selector: ClefSelector,
    ) -> Result<()> {
        seq.clear();
        let measure_beats = self.state.time_signature.measure_beats();
        let mut time = 0.0;

        for measure in 0..measures {
            let mut remaining = measure_beats;
            let mut eighth_present = false;
            let mut triplet_present = false;
            let mut rejected = 0;

            while remaining > 0.0 {
                if rejected >= MAX_REJECTED_DRAWS {
                    return Err(GeneratorError::GenerationFailed { attempts: rejected });
                }

                let mut note = self.random_note(None, false, selector)?;
                match note.note_type {
                    NoteType::Triplet => {
                        // the group must leave a whole number of beats
                        if remaining < 1.0 || eighth_present || remaining.fract() != 0.0 {
                            rejected += 1;
                            continue;
                        }
                        let group = self.triplet_group(note, rhythm_only, time)?;
                        for n in &group {
                            time += n.duration;
                        }
                        remaining -= 1.0;
                        triplet_present = true;
                        rejected = 0;
                        seq.extend(group);
                        continue;
                    }
                    NoteType::Silence => match self.silence_duration() {
                        Some(duration) => note.duration = duration,
                        None => {
                            rejected += 1;
                            continue;
                        }
                    },
                    NoteType::Eighth if triplet_present => {
                        rejected += 1;
                        continue;
                    }
                    _ => {}
                }

                if rhythm_only {
                    note.level = MIDDLE_LINE_LEVEL;
                    note.pitch = self.rhythm_pitch(note.clef);
                }

                if note.duration > remaining
                    || (triplet_present && (remaining - note.duration).fract() != 0.0)
                {
                    rejected += 1;
                    continue;
                }

                remaining -= note.duration;
                if note.note_type == NoteType::Eighth {
                    eighth_present = true;
                }
                note.timestamp = time;
                time += note.duration;
                rejected = 0;

                debug!(
                    "measure {}: pitch {}, level {}, type {}, ts {}",
                    measure, note.pitch, note.level, note.note_type, note.timestamp
                );
                seq.push(note);
            }
        }

        Ok(())
    }

    /// Duration for a silence, drawn from the other enabled types.
    ///
    /// Returns `None` when the draw lands on a dotted or triplet value,
    /// which a silence may not take.
    fn silence_duration(&mut self) -> Option<f64> {
        let candidates: Vec<NoteType> = self
            .state
            .note_types
            .iter()
            .copied()
            .filter(|t| *t != NoteType::Silence)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let drawn = candidates[self.rng.gen_range(0..candidates.len())];
        if drawn.is_dotted() || drawn == NoteType::Triplet {
            return None;
        }
        Some(drawn.duration())
    }

    /// Complete a triplet lead with two companions and tag the group
    fn triplet_group(&mut self, mut lead: Note, rhythm_only: bool, start: f64) -> Result<[Note; 3]> {
        let mut second = self.triplet_random_note(lead.pitch)?;
        let mut third = self.triplet_random_note(lead.pitch)?;

        if rhythm_only {
            let pitch = self.rhythm_pitch(lead.clef);
            for n in [&mut lead, &mut second, &mut third] {
                n.level = MIDDLE_LINE_LEVEL;
                n.pitch = pitch;
            }
        }

        let levels = [lead.level, second.level, third.level];
        let (value, sign) = if rhythm_only {
            (lead.level, 1)
        } else if lead.level >= MIDDLE_LINE_LEVEL {
            (levels.iter().copied().min().unwrap_or(lead.level), 1)
        } else {
            (-levels.iter().copied().max().unwrap_or(lead.level), -1)
        };

        lead.triplet_value = value;
        second.triplet_value = value + sign * TRIPLET_COMPANION_TAG;
        third.triplet_value = value + sign * TRIPLET_COMPANION_TAG;

        let mut time = start;
        for n in [&mut lead, &mut second, &mut third] {
            n.timestamp = time;
            time += n.duration;
        }

        debug!(
            "triplet group: pitches {} {} {}, value {}",
            lead.pitch, second.pitch, third.pitch, value
        );
        Ok([lead, second, third])
    }
}
