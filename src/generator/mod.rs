// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Random note, chord and rhythm generation for practice exercises.
//!
//! [`rebuild`] turns a [`GenerationConfig`] into a [`GeneratorState`]
//! (pitch tables, ranges, enabled note types and time signature).
//! [`NoteGenerator`] owns one state plus the random source and serves
//! notes, triplet companions, full measure sequences and chords or
//! intervals from it.

pub mod harmony;
pub mod range;
pub mod sequence;
pub mod triplet;

pub use harmony::Harmony;
pub use range::{ClefSelector, RangeRegistry};
pub use sequence::MAX_REJECTED_DRAWS;
pub use triplet::triplet_window;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::{GenerationConfig, PlaybackMode, Preferences, TimeSignature};
use crate::error::{GeneratorError, Result};
use crate::music::{
    alteration, Clef, ClefMapper, ClefMask, MidiNote, Note, NoteType, PitchTable, Semitones,
};

/// Tables derived from one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorState {
    pub table: PitchTable,
    pub ranges: RangeRegistry,
    pub note_types: Vec<NoteType>,
    pub time_signature: TimeSignature,
    /// Clefs actually registered (only the first one in single-clef mode)
    pub clefs: ClefMask,
}

/// Build every derived table for `config`
pub fn rebuild(config: &GenerationConfig) -> Result<GeneratorState> {
    if config.note_types.is_empty() {
        return Err(GeneratorError::InvalidConfiguration(
            "no note types enabled".to_string(),
        ));
    }

    let table = PitchTable::build(config.key_signature);
    let mut ranges =
        RangeRegistry::new(config.single_clef).with_strict_lookups(config.strict_lookups);
    let staves = if config.single_clef { 1 } else { 2 };
    if config.clefs.count() > staves {
        warn!(
            "{} clefs enabled, only the first {} get a range",
            config.clefs.count(),
            staves
        );
    }

    let registered: Vec<Clef> = config.clefs.clefs().take(staves).collect();
    for &clef in &registered {
        let bounds = config.bounds_for(clef);
        ranges.add_range(&table, clef, bounds.lower, bounds.upper)?;
    }
    let clefs = ClefMask::from_clefs(&registered);

    debug!(
        "rebuilt generator: {} ({} entries), types {:?}, time {}",
        config.key_signature,
        ranges.count(),
        config.note_types,
        config.time_signature
    );

    Ok(GeneratorState {
        table,
        ranges,
        note_types: config.note_types.clone(),
        time_signature: config.time_signature,
        clefs,
    })
}

/// Serves random notes, sequences and chords for one exercise session
#[derive(Debug)]
pub struct NoteGenerator {
    state: GeneratorState,
    playback: PlaybackMode,
    /// Next entry in sequential mode
    cursor: usize,
    rng: StdRng,
}

impl NoteGenerator {
    /// Create a generator seeded from entropy
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a generator with a reproducible random sequence
    pub fn with_seed(config: &GenerationConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: &GenerationConfig, rng: StdRng) -> Result<Self> {
        Ok(Self {
            state: rebuild(config)?,
            playback: config.playback,
            cursor: 0,
            rng,
        })
    }

    /// Rebuild from a new configuration.
    ///
    /// The previous state stays in place if the configuration is rejected.
    pub fn update(&mut self, config: &GenerationConfig) -> Result<()> {
        let state = rebuild(config)?;
        self.state = state;
        self.playback = config.playback;
        self.cursor = 0;
        Ok(())
    }

    /// Resolve a preferences bag and rebuild from it
    pub fn update_from_preferences(&mut self, prefs: &Preferences) -> Result<()> {
        let config = GenerationConfig::from_preferences(prefs)?;
        self.update(&config)
    }

    /// Drop all ranges; tables and note types are kept
    pub fn reset(&mut self) {
        self.state.ranges.reset();
        self.cursor = 0;
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn ranges(&self) -> &RangeRegistry {
        &self.state.ranges
    }

    pub fn table(&self) -> &PitchTable {
        &self.state.table
    }

    pub fn note_types(&self) -> &[NoteType] {
        &self.state.note_types
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.state.time_signature
    }

    pub fn clef_mask(&self) -> ClefMask {
        self.state.clefs
    }

    pub fn playback(&self) -> PlaybackMode {
        self.playback
    }

    pub fn set_playback(&mut self, playback: PlaybackMode) {
        self.playback = playback;
        self.cursor = 0;
    }

    pub fn notes_number(&self) -> usize {
        self.state.ranges.count()
    }

    /// Number of staves in use (1 or 2)
    pub fn clefs_number(&self) -> usize {
        if self.state.ranges.has_secondary() {
            2
        } else {
            1
        }
    }

    pub fn first_low_pitch(&self) -> Option<MidiNote> {
        self.state.ranges.first_low_pitch()
    }

    pub fn first_high_pitch(&self) -> Option<MidiNote> {
        self.state.ranges.first_high_pitch()
    }

    pub fn second_low_pitch(&self) -> Option<MidiNote> {
        self.state.ranges.second_low_pitch()
    }

    pub fn second_high_pitch(&self) -> Option<MidiNote> {
        self.state.ranges.second_high_pitch()
    }

    /// Vertical space the renderer should reserve for the configured staves
    pub fn rows_distance(&self) -> i32 {
        let ranges = &self.state.ranges;
        let levels = match ranges.secondary_start() {
            None => ranges.count(),
            Some(start) => start.max(ranges.count() - start),
        } as i32;

        let height = if levels * 5 < 50 {
            90
        } else {
            90 + (levels - 9) * 5
        };

        if ranges.has_secondary() {
            height * 2
        } else {
            height
        }
    }

    /// Vertical space for one staff per clef in `mask`
    pub fn rows_distance_from_clefs(mask: ClefMask) -> i32 {
        mask.count() as i32 * 90
    }

    /// Key-signature pitch for a natural pitch
    pub fn altered_from_base(&self, natural: MidiNote) -> Option<MidiNote> {
        self.state.table.altered_from_natural(natural)
    }

    /// Alteration implied by the key signature at `pitch`
    pub fn alteration(&self, pitch: MidiNote) -> Semitones {
        self.state.table.alteration_offset(pitch)
    }

    pub fn rhythm_pitch(&self, clef: Clef) -> MidiNote {
        ClefMapper::new(&self.state.table).rhythm_reference_pitch(clef)
    }

    /// Natural pitch at `level` on `clef`
    pub fn pitch_from_clef_and_level(&self, clef: Clef, level: i32) -> Result<MidiNote> {
        ClefMapper::new(&self.state.table).pitch_from_level(clef, level)
    }

    pub fn level_from_clef_and_pitch(&self, clef: Clef, pitch: MidiNote) -> i32 {
        ClefMapper::new(&self.state.table).level_from_pitch(clef, pitch)
    }

    /// Replace random draws with a replay of already generated notes.
    ///
    /// Both sequences are merged into the registry in timestamp order (the
    /// first sequence wins ties) with silences dropped, then the cursor is
    /// rewound. Entries are appended to whatever the registry holds.
    pub fn set_notes_list(&mut self, first: &[Note], second: &[Note], random: bool) {
        let mut a = first.iter().filter(|n| !n.is_silence()).peekable();
        let mut b = second.iter().filter(|n| !n.is_silence()).peekable();

        loop {
            let take_first = match (a.peek(), b.peek()) {
                (Some(x), Some(y)) => x.timestamp <= y.timestamp,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_first { a.next() } else { b.next() };
            if let Some(note) = next {
                debug!("set_notes_list: pitch {} at {}", note.pitch, note.timestamp);
                self.state.ranges.push_entry(note.clone());
            }
        }

        self.playback = if random {
            PlaybackMode::Random
        } else {
            PlaybackMode::Sequential
        };
        self.cursor = 0;
    }

    /// Draw one note from the ranges.
    ///
    /// `forced_type` overrides the random rhythmic type. With
    /// `with_alteration`, the pitch is shifted by -1, 0 or +1 semitone and
    /// the accidental reconciled against the key signature.
    pub fn random_note(
        &mut self,
        forced_type: Option<NoteType>,
        with_alteration: bool,
        selector: ClefSelector,
    ) -> Result<Note> {
        let index = self.next_index(selector)?;
        let template = self
            .state
            .ranges
            .get(index)
            .ok_or(GeneratorError::EmptyRange)?;

        let note_type = match forced_type {
            Some(t) => t,
            None => {
                let types = &self.state.note_types;
                if types.is_empty() {
                    return Err(GeneratorError::InvalidConfiguration(
                        "no note types enabled".to_string(),
                    ));
                }
                types[self.rng.gen_range(0..types.len())]
            }
        };

        let mut note = Note::new(
            template.clef,
            template.level,
            template.pitch,
            note_type,
            template.secondary_row,
            template.alteration,
        );

        if with_alteration {
            let shift: i8 = self.rng.gen_range(-1..=1);
            let signature_offset = self.state.table.alteration_offset(note.pitch);
            apply_alteration(&mut note, shift, signature_offset);
        }

        debug!(
            "random note: pitch {}, level {}, type {}, alt {}",
            note.pitch, note.level, note.note_type, note.alteration
        );
        Ok(note)
    }

    /// Draw a triplet companion close to `base_pitch` within its own range
    pub fn triplet_random_note(&mut self, base_pitch: MidiNote) -> Result<Note> {
        let ranges = &self.state.ranges;
        if ranges.is_empty() {
            return Err(GeneratorError::EmptyRange);
        }

        let base_index = ranges
            .entries()
            .iter()
            .position(|n| n.pitch == base_pitch)
            .unwrap_or(0);
        let span = ranges.span_containing(base_index);
        let (shift, count) = triplet_window(base_index, span.start, span.end - 1);
        let index = (base_index as isize + shift) as usize + self.rng.gen_range(0..count);

        let ranges = &self.state.ranges;
        let base = ranges.get(base_index).ok_or(GeneratorError::EmptyRange)?;
        let other = ranges.get(index).ok_or(GeneratorError::EmptyRange)?;
        let note = Note::new(
            base.clef,
            other.level,
            other.pitch,
            NoteType::Triplet,
            base.secondary_row,
            other.alteration,
        );

        debug!(
            "triplet base {} (index {}), companion {} (index {})",
            base_pitch, base_index, note.pitch, index
        );
        Ok(note)
    }

    fn next_index(&mut self, selector: ClefSelector) -> Result<usize> {
        let count = self.state.ranges.count();
        if count == 0 {
            return Err(GeneratorError::EmptyRange);
        }

        match self.playback {
            PlaybackMode::Random => {
                let span = self.state.ranges.span(selector);
                if span.is_empty() {
                    return Err(GeneratorError::EmptyRange);
                }
                Ok(self.rng.gen_range(span))
            }
            PlaybackMode::Sequential => {
                if self.cursor >= count {
                    self.cursor = 0;
                }
                let index = self.cursor;
                self.cursor = (self.cursor + 1) % count;
                Ok(index)
            }
        }
    }
}

/// Apply a random semitone shift to a note drawn from the ranges.
///
/// The sounding pitch always moves by `shift`. The displayed accidental
/// depends on what the key signature already does at that step: against a
/// flat, raising asks for a natural and lowering borrows the next level
/// down; against a sharp it is the mirror image.
pub(crate) fn apply_alteration(note: &mut Note, shift: i8, signature_offset: Semitones) {
    match signature_offset {
        0 => note.alteration = shift,
        -1 => match shift {
            1 => note.alteration = alteration::NATURAL,
            -1 => note.level += 1,
            _ => {}
        },
        1 => match shift {
            -1 => note.alteration = alteration::NATURAL,
            1 => note.level -= 1,
            _ => {}
        },
        _ => {}
    }
    note.pitch = (note.pitch as i16 + shift as i16) as MidiNote;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PitchBounds;
    use crate::music::KeySignature;
    use crate::music::SignatureKind;

    fn two_clef_config() -> GenerationConfig {
        GenerationConfig {
            clefs: ClefMask::from_clefs(&[Clef::Treble, Clef::Bass]),
            note_types: vec![NoteType::Quarter],
            ..Default::default()
        }
    }

    fn config_with_types(note_types: Vec<NoteType>) -> GenerationConfig {
        GenerationConfig {
            note_types,
            ..Default::default()
        }
    }

    #[test]
    fn test_rebuild_single_clef() {
        let state = rebuild(&GenerationConfig::default()).unwrap();
        assert_eq!(state.ranges.count(), 9);
        assert_eq!(state.ranges.primary_clef(), Some(Clef::Treble));
        assert_eq!(state.clefs, ClefMask::TREBLE);
        assert_eq!(state.time_signature, TimeSignature::new(4, 4));
    }

    #[test]
    fn test_rebuild_single_clef_mode() {
        let config = GenerationConfig {
            single_clef: true,
            ..two_clef_config()
        };
        let state = rebuild(&config).unwrap();
        assert!(!state.ranges.has_secondary());
        assert_eq!(state.clefs, ClefMask::only(Clef::Treble));
    }

    #[test]
    fn test_rebuild_caps_at_two_ranges() {
        let config = GenerationConfig {
            clefs: ClefMask::from_bits(0b1111),
            ..Default::default()
        };
        let state = rebuild(&config).unwrap();
        assert_eq!(state.ranges.primary_clef(), Some(Clef::Treble));
        assert_eq!(state.ranges.secondary_clef(), Some(Clef::Bass));
        assert_eq!(state.clefs, ClefMask::from_clefs(&[Clef::Treble, Clef::Bass]));
    }

    #[test]
    fn test_rebuild_rejects_empty_types() {
        let config = GenerationConfig {
            note_types: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            rebuild(&config),
            Err(GeneratorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut gen = NoteGenerator::with_seed(&GenerationConfig::default(), 1).unwrap();
        let before = gen.state().clone();

        let mut bad = two_clef_config();
        bad.set_bounds(Clef::Bass, PitchBounds::new(43, 44));
        assert!(gen.update(&bad).is_err());
        assert_eq!(gen.state(), &before);

        gen.update(&two_clef_config()).unwrap();
        assert_eq!(gen.clefs_number(), 2);
        assert_eq!(gen.second_low_pitch(), Some(43));
    }

    #[test]
    fn test_random_note_within_selector() {
        let mut gen = NoteGenerator::with_seed(&two_clef_config(), 7).unwrap();
        for _ in 0..200 {
            let note = gen.random_note(None, false, ClefSelector::Second).unwrap();
            assert!(note.secondary_row);
            assert_eq!(note.clef, Clef::Bass);
            assert_eq!(note.note_type, NoteType::Quarter);

            let note = gen.random_note(None, false, ClefSelector::First).unwrap();
            assert!(!note.secondary_row);
            assert!(note.pitch >= 64 && note.pitch <= 77);
        }
    }

    #[test]
    fn test_random_note_does_not_touch_ranges() {
        let mut gen = NoteGenerator::with_seed(&GenerationConfig::default(), 3).unwrap();
        let before = gen.ranges().clone();
        for _ in 0..50 {
            gen.random_note(None, true, ClefSelector::Any).unwrap();
        }
        assert_eq!(gen.ranges(), &before);
    }

    #[test]
    fn test_sequential_mode_wraps() {
        let config = GenerationConfig {
            playback: PlaybackMode::Sequential,
            ..Default::default()
        };
        let mut gen = NoteGenerator::with_seed(&config, 0).unwrap();
        let expected: Vec<_> = gen.ranges().entries().iter().map(|n| n.pitch).collect();

        let drawn: Vec<_> = (0..expected.len() + 2)
            .map(|_| gen.random_note(Some(NoteType::Whole), false, ClefSelector::Any).unwrap().pitch)
            .collect();
        assert_eq!(&drawn[..expected.len()], &expected[..]);
        assert_eq!(drawn[expected.len()], expected[0]);
        assert_eq!(drawn[expected.len() + 1], expected[1]);
    }

    #[test]
    fn test_alteration_table() {
        let base = Note::new(Clef::Treble, 15, 66, NoteType::Quarter, false, 0);

        let mut note = base.clone();
        apply_alteration(&mut note, 1, 0);
        assert_eq!((note.pitch, note.alteration, note.level), (67, 1, 15));

        let mut note = base.clone();
        apply_alteration(&mut note, 1, -1);
        assert_eq!((note.pitch, note.alteration, note.level), (67, alteration::NATURAL, 15));

        let mut note = base.clone();
        apply_alteration(&mut note, -1, -1);
        assert_eq!((note.pitch, note.alteration, note.level), (65, 0, 16));

        let mut note = base.clone();
        apply_alteration(&mut note, -1, 1);
        assert_eq!((note.pitch, note.alteration, note.level), (65, alteration::NATURAL, 15));

        let mut note = base.clone();
        apply_alteration(&mut note, 1, 1);
        assert_eq!((note.pitch, note.alteration, note.level), (67, 0, 14));

        let mut note = base.clone();
        apply_alteration(&mut note, 0, 1);
        assert_eq!(note, base);
    }

    #[test]
    fn test_random_alteration_moves_pitch_by_one() {
        let config = GenerationConfig {
            key_signature: KeySignature::new(SignatureKind::Flats, 3).unwrap(),
            note_types: vec![NoteType::Whole],
            ..Default::default()
        };
        let mut gen = NoteGenerator::with_seed(&config, 11).unwrap();
        let pitches: Vec<_> = gen.ranges().entries().iter().map(|n| n.pitch).collect();
        for _ in 0..200 {
            let note = gen.random_note(None, true, ClefSelector::Any).unwrap();
            assert!(pitches
                .iter()
                .any(|&p| (p as i16 - note.pitch as i16).abs() <= 1));
        }
    }

    #[test]
    fn test_alteration_applies_to_silences() {
        let mut gen = NoteGenerator::with_seed(&config_with_types(vec![NoteType::Silence]), 13).unwrap();
        let mut shifted = false;
        for _ in 0..100 {
            let note = gen.random_note(None, true, ClefSelector::Any).unwrap();
            assert!(note.is_silence());
            assert_eq!(note.level, 10);
            assert_eq!(note.alteration as i16, note.pitch as i16 - 71);
            shifted |= note.pitch != 71;
        }
        assert!(shifted);
    }

    #[test]
    fn test_triplet_note_stays_in_range() {
        let mut gen = NoteGenerator::with_seed(&two_clef_config(), 5).unwrap();
        let first = gen.ranges().entries()[8].clone();
        let second = gen.ranges().entries()[9].clone();
        for _ in 0..100 {
            let note = gen.triplet_random_note(first.pitch).unwrap();
            assert_eq!(note.note_type, NoteType::Triplet);
            assert!(!note.secondary_row);
            assert!(note.pitch <= 77 && note.pitch >= 72);

            let note = gen.triplet_random_note(second.pitch).unwrap();
            assert!(note.secondary_row);
            assert!(note.pitch >= 43 && note.pitch <= 47);
        }
    }

    #[test]
    fn test_rows_distance() {
        let gen = NoteGenerator::with_seed(&GenerationConfig::default(), 0).unwrap();
        assert_eq!(gen.rows_distance(), 90);

        let gen = NoteGenerator::with_seed(&two_clef_config(), 0).unwrap();
        assert_eq!(gen.rows_distance(), 180);

        assert_eq!(
            NoteGenerator::rows_distance_from_clefs(ClefMask::from_bits(0b1011)),
            270
        );
    }

    #[test]
    fn test_set_notes_list_merges_by_time() {
        let mut gen = NoteGenerator::with_seed(&GenerationConfig::default(), 0).unwrap();
        gen.reset();

        let mut first = vec![
            Note::new(Clef::Treble, 12, 71, NoteType::Quarter, false, 0),
            Note::new(Clef::Treble, 10, 71, NoteType::Silence, false, 0),
            Note::new(Clef::Treble, 11, 72, NoteType::Quarter, false, 0),
        ];
        first[1].timestamp = 1.0;
        first[2].timestamp = 2.0;
        let mut second = vec![
            Note::new(Clef::Bass, 12, 50, NoteType::Half, true, 0),
            Note::new(Clef::Bass, 11, 52, NoteType::Half, true, 0),
        ];
        second[0].timestamp = 0.0;
        second[1].timestamp = 1.5;

        gen.set_notes_list(&first, &second, false);
        let pitches: Vec<_> = gen.ranges().entries().iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![71, 50, 52, 72]);
        assert_eq!(gen.playback(), PlaybackMode::Sequential);

        let drawn = gen
            .random_note(Some(NoteType::Quarter), false, ClefSelector::Any)
            .unwrap();
        assert_eq!(drawn.pitch, 71);
    }

    #[test]
    fn test_queries() {
        let config = GenerationConfig {
            key_signature: KeySignature::new(SignatureKind::Flats, 1).unwrap(),
            ..Default::default()
        };
        let gen = NoteGenerator::with_seed(&config, 0).unwrap();
        assert_eq!(gen.altered_from_base(71), Some(70));
        assert_eq!(gen.alteration(70), -1);
        assert_eq!(gen.alteration(72), 0);
        assert_eq!(gen.rhythm_pitch(Clef::Treble), 71);
        assert_eq!(gen.pitch_from_clef_and_level(Clef::Treble, 12).unwrap(), 71);
        assert_eq!(gen.level_from_clef_and_pitch(Clef::Treble, 70), 12);
        assert_eq!(gen.first_low_pitch(), Some(64));
        assert_eq!(gen.first_high_pitch(), Some(77));
        assert_eq!(gen.notes_number(), 9);
    }
}
