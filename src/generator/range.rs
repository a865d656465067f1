// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playable pitch ranges.
//!
//! A registry holds one flat list of template notes built from one or two
//! `add_range` calls. The first call forms the primary range; a second one
//! (when more than one clef is in use) forms the secondary range, whose
//! entries are flagged `secondary_row` and start at `secondary_start`.

use std::ops::Range;

use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::music::{Clef, ClefMapper, MidiNote, Note, NoteType, PitchTable};

/// Which configured range a draw may come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClefSelector {
    /// Any entry of either range
    #[default]
    Any,
    /// The primary range only
    First,
    /// The secondary range only
    Second,
}

/// Ordered template notes for the configured ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeRegistry {
    entries: Vec<Note>,
    primary_clef: Option<Clef>,
    secondary_clef: Option<Clef>,
    secondary_start: Option<usize>,
    single_clef: bool,
    strict_lookups: bool,
}

impl RangeRegistry {
    pub fn new(single_clef: bool) -> Self {
        Self {
            single_clef,
            ..Default::default()
        }
    }

    /// Fail on pitches the clef mapping cannot place instead of using level 0
    pub fn with_strict_lookups(mut self, strict: bool) -> Self {
        self.strict_lookups = strict;
        self
    }

    /// Remove all ranges
    pub fn reset(&mut self) {
        self.entries.clear();
        self.primary_clef = None;
        self.secondary_clef = None;
        self.secondary_start = None;
    }

    /// Append every table step between two natural pitches (inclusive).
    ///
    /// The first call sets the primary range. A later call sets the
    /// secondary range, unless single-clef mode is on, in which case it
    /// does nothing. Ranges are appended as given; nothing is sorted.
    pub fn add_range(
        &mut self,
        table: &PitchTable,
        clef: Clef,
        lower: MidiNote,
        upper: MidiNote,
    ) -> Result<()> {
        let low_idx = table_index(table, lower)?;
        let high_idx = table_index(table, upper)?;
        if low_idx > high_idx {
            return Err(GeneratorError::InvalidConfiguration(format!(
                "range {}..{} for {} clef is reversed",
                lower, upper, clef
            )));
        }

        debug!("add_range clef: {}, lower: {}, upper: {}", clef, lower, upper);

        let secondary = if self.entries.is_empty() {
            self.primary_clef = Some(clef);
            false
        } else {
            if self.single_clef {
                return Ok(());
            }
            self.secondary_clef = Some(clef);
            self.secondary_start = Some(self.entries.len());
            true
        };

        let mapper = ClefMapper::new(table);
        for &pitch in &table.altered()[low_idx..=high_idx] {
            let level = match mapper.find_level(clef, pitch) {
                Some(level) => level,
                None if self.strict_lookups => return Err(GeneratorError::PitchNotFound(pitch)),
                None => mapper.level_from_pitch(clef, pitch),
            };
            self.entries
                .push(Note::new(clef, level, pitch, NoteType::Whole, secondary, 0));
        }

        debug!(
            "range pitches: {:?}",
            self.entries.iter().map(|n| n.pitch).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Append already generated notes as sequential playback entries
    pub fn push_entry(&mut self, note: Note) {
        if self.entries.is_empty() {
            self.primary_clef = Some(note.clef);
        }
        self.entries.push(note);
    }

    pub fn entries(&self) -> &[Note] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.entries.get(index)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn primary_clef(&self) -> Option<Clef> {
        self.primary_clef
    }

    pub fn secondary_clef(&self) -> Option<Clef> {
        self.secondary_clef
    }

    /// Index of the first secondary entry, `None` with a single range
    pub fn secondary_start(&self) -> Option<usize> {
        self.secondary_start
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary_start.is_some()
    }

    /// Index span of the primary range
    pub fn primary_span(&self) -> Range<usize> {
        0..self.secondary_start.unwrap_or(self.entries.len())
    }

    /// Index span of the secondary range (empty when absent)
    pub fn secondary_span(&self) -> Range<usize> {
        match self.secondary_start {
            Some(start) => start..self.entries.len(),
            None => self.entries.len()..self.entries.len(),
        }
    }

    /// Span a draw may come from; selectors fall back to everything with one range
    pub fn span(&self, selector: ClefSelector) -> Range<usize> {
        match (selector, self.secondary_start) {
            (ClefSelector::First, Some(_)) => self.primary_span(),
            (ClefSelector::Second, Some(_)) => self.secondary_span(),
            _ => 0..self.entries.len(),
        }
    }

    /// Span of the range holding `index`
    pub fn span_containing(&self, index: usize) -> Range<usize> {
        match self.secondary_start {
            Some(start) if index >= start => self.secondary_span(),
            Some(_) => self.primary_span(),
            None => 0..self.entries.len(),
        }
    }

    pub fn first_low_pitch(&self) -> Option<MidiNote> {
        self.entries.first().map(|n| n.pitch)
    }

    pub fn first_high_pitch(&self) -> Option<MidiNote> {
        let end = self.primary_span().end;
        end.checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|n| n.pitch)
    }

    pub fn second_low_pitch(&self) -> Option<MidiNote> {
        self.secondary_start
            .and_then(|i| self.entries.get(i))
            .map(|n| n.pitch)
    }

    pub fn second_high_pitch(&self) -> Option<MidiNote> {
        self.secondary_start
            .and_then(|_| self.entries.last())
            .map(|n| n.pitch)
    }
}

/// Table index of a range bound, given as a natural or an altered pitch
fn table_index(table: &PitchTable, pitch: MidiNote) -> Result<usize> {
    table
        .natural_index(pitch)
        .or_else(|| table.altered_index(pitch))
        .ok_or_else(|| {
            GeneratorError::InvalidConfiguration(format!(
                "range bound {} is not a diatonic pitch",
                pitch
            ))
        })
}
