// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for Calao.
//!
//! Exercise settings arrive as an opaque, string-keyed preferences bag
//! (loaded from YAML or TOML). [`GenerationConfig::from_preferences`]
//! resolves every "use default" sentinel once, producing the immutable
//! value the generator rebuilds its tables from.

pub mod watcher;

pub use watcher::{validate_preferences, PreferencesEvent, PreferencesWatcher};

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GeneratorError;
use crate::music::{Clef, ClefMask, KeySignature, MidiNote, NoteType};

/// Preference keys read by [`GenerationConfig::from_preferences`]
pub mod keys {
    pub const CLEFS_MASK: &str = "clefs_mask";
    pub const ACCIDENTALS: &str = "accidentals";
    pub const TIME_SIGNATURE: &str = "time_signature";
    pub const WHOLE_NOTE: &str = "whole_note";
    pub const HALF_NOTE: &str = "half_note";
    pub const QUARTER_NOTE: &str = "quarter_note";
    pub const EIGHTH_NOTE: &str = "eighth_note";
    pub const TRIPLET_NOTE: &str = "triplet_note";
    pub const DOTTED_HALF_NOTE: &str = "dotted_half_note";
    pub const DOTTED_QUARTER_NOTE: &str = "dotted_quarter_note";
    pub const SILENCE_NOTE: &str = "silence_note";
    pub const SINGLE_CLEF: &str = "single_clef";
    pub const SEQUENTIAL: &str = "sequential";
    pub const STRICT_LOOKUPS: &str = "strict_lookups";
}

/// Value types supported in the preferences bag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// String-keyed preference storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Preferences {
    pub params: HashMap<String, PrefValue>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load preferences from a YAML or TOML file, chosen by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences file: {:?}", path))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML preferences")
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML preferences")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize preferences to YAML")
    }

    /// Save preferences to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write preferences file: {:?}", path.as_ref()))
    }

    /// Get an integer preference with default. Numeric strings are accepted.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.params.get(key) {
            Some(PrefValue::Int(v)) => *v,
            Some(PrefValue::Float(v)) => *v as i64,
            Some(PrefValue::Bool(v)) => *v as i64,
            Some(PrefValue::String(s)) => s.trim().parse().unwrap_or(default),
            None => default,
        }
    }

    /// Get a boolean preference with default. Integers are true when 1.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.params.get(key) {
            Some(PrefValue::Bool(v)) => *v,
            Some(PrefValue::Int(v)) => *v == 1,
            Some(PrefValue::String(s)) => match s.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.params.get(key) {
            Some(PrefValue::String(v)) => v.clone(),
            _ => default.to_string(),
        }
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.params.insert(key.to_string(), PrefValue::Int(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.params.insert(key.to_string(), PrefValue::Bool(value));
    }
}

/// Time signatures offered by the exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    /// The six supported signatures, by preference index
    pub const SUPPORTED: [TimeSignature; 6] = [
        TimeSignature::new(4, 4),
        TimeSignature::new(2, 4),
        TimeSignature::new(3, 4),
        TimeSignature::new(6, 8),
        TimeSignature::new(6, 4),
        TimeSignature::new(3, 8),
    ];

    pub const fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Decode the preference index; unknown indices fall back to 4/4
    pub fn from_index(index: i64) -> Self {
        if index <= 0 {
            return Self::SUPPORTED[0];
        }
        match Self::SUPPORTED.get(index as usize) {
            Some(ts) => *ts,
            None => {
                warn!("Unknown time signature index {}, using 4/4", index);
                Self::SUPPORTED[0]
            }
        }
    }

    /// Beats in one measure, counted in quarter notes
    pub fn measure_beats(&self) -> f64 {
        let beats = self.numerator as f64;
        if self.denominator == 8 {
            beats / 2.0
        } else {
            beats
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::SUPPORTED[0]
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// How range entries are picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Random,
    /// Walk the range entries in order, wrapping at the end
    Sequential,
}

/// Lower and upper natural pitch of one clef's playable range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchBounds {
    pub lower: MidiNote,
    pub upper: MidiNote,
}

impl PitchBounds {
    pub fn new(lower: MidiNote, upper: MidiNote) -> Self {
        Self { lower, upper }
    }

    pub fn default_for(clef: Clef) -> Self {
        let (lower, upper) = clef.default_bounds();
        Self { lower, upper }
    }
}

/// Everything the generator needs to rebuild its tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub clefs: ClefMask,
    /// Bounds in clef order: treble, bass, alto, tenor
    #[serde(default = "default_bounds")]
    pub bounds: [PitchBounds; 4],
    #[serde(default)]
    pub key_signature: KeySignature,
    #[serde(default = "default_note_types")]
    pub note_types: Vec<NoteType>,
    #[serde(default)]
    pub time_signature: TimeSignature,
    /// Keep only the first enabled clef
    #[serde(default)]
    pub single_clef: bool,
    #[serde(default)]
    pub playback: PlaybackMode,
    /// Fail range construction on pitch lookup misses instead of using level 0
    #[serde(default)]
    pub strict_lookups: bool,
}

fn default_bounds() -> [PitchBounds; 4] {
    Clef::ALL.map(PitchBounds::default_for)
}

fn default_note_types() -> Vec<NoteType> {
    vec![NoteType::Whole, NoteType::Half, NoteType::Silence]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            clefs: ClefMask::default(),
            bounds: default_bounds(),
            key_signature: KeySignature::default(),
            note_types: default_note_types(),
            time_signature: TimeSignature::default(),
            single_clef: false,
            playback: PlaybackMode::default(),
            strict_lookups: false,
        }
    }
}

impl GenerationConfig {
    /// Resolve a preferences bag into a complete configuration.
    ///
    /// Bounds set to -1 (or missing) use the clef defaults. Whole, half and
    /// silence types are enabled unless explicitly set to 0; every other
    /// type must be set to 1.
    pub fn from_preferences(prefs: &Preferences) -> Result<Self, GeneratorError> {
        let clefs = ClefMask::from_bits(prefs.get_int(keys::CLEFS_MASK, -1));

        let mut bounds = default_bounds();
        for (slot, clef) in bounds.iter_mut().zip(Clef::ALL) {
            let (default_lower, default_upper) = clef.default_bounds();
            let lower = prefs.get_int(&format!("{}_lower", clef.key()), -1);
            let upper = prefs.get_int(&format!("{}_upper", clef.key()), -1);
            *slot = PitchBounds::new(
                resolve_bound(lower, default_lower)?,
                resolve_bound(upper, default_upper)?,
            );
        }

        let key_signature = KeySignature::from_index(prefs.get_int(keys::ACCIDENTALS, 0))?;

        let toggles = [
            (keys::WHOLE_NOTE, NoteType::Whole, true),
            (keys::HALF_NOTE, NoteType::Half, true),
            (keys::QUARTER_NOTE, NoteType::Quarter, false),
            (keys::EIGHTH_NOTE, NoteType::Eighth, false),
            (keys::TRIPLET_NOTE, NoteType::Triplet, false),
            (keys::DOTTED_HALF_NOTE, NoteType::DottedHalf, false),
            (keys::DOTTED_QUARTER_NOTE, NoteType::DottedQuarter, false),
            (keys::SILENCE_NOTE, NoteType::Silence, true),
        ];
        let note_types = toggles
            .iter()
            .filter(|(key, _, on_by_default)| {
                let value = prefs.get_int(key, -1);
                value == 1 || (value == -1 && *on_by_default)
            })
            .map(|(_, note_type, _)| *note_type)
            .collect();

        let playback = if prefs.get_bool(keys::SEQUENTIAL, false) {
            PlaybackMode::Sequential
        } else {
            PlaybackMode::Random
        };

        Ok(Self {
            clefs,
            bounds,
            key_signature,
            note_types,
            time_signature: TimeSignature::from_index(prefs.get_int(keys::TIME_SIGNATURE, 0)),
            single_clef: prefs.get_bool(keys::SINGLE_CLEF, false),
            playback,
            strict_lookups: prefs.get_bool(keys::STRICT_LOOKUPS, false),
        })
    }

    /// Load and resolve a preferences file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let prefs = Preferences::load(path.as_ref())?;
        Self::from_preferences(&prefs)
            .with_context(|| format!("Invalid preferences in {:?}", path.as_ref()))
    }

    pub fn bounds_for(&self, clef: Clef) -> PitchBounds {
        let index = Clef::ALL.iter().position(|c| *c == clef).unwrap_or(0);
        self.bounds[index]
    }

    pub fn set_bounds(&mut self, clef: Clef, bounds: PitchBounds) {
        if let Some(index) = Clef::ALL.iter().position(|c| *c == clef) {
            self.bounds[index] = bounds;
        }
    }
}

fn resolve_bound(value: i64, default: MidiNote) -> Result<MidiNote, GeneratorError> {
    match value {
        -1 => Ok(default),
        0..=127 => Ok(value as MidiNote),
        _ => Err(GeneratorError::InvalidConfiguration(format!(
            "pitch bound {} out of range",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::SignatureKind;

    #[test]
    fn test_parse_preferences() {
        let yaml = r#"
clefs_mask: 3
clef_g2_lower: 60
clef_g2_upper: -1
accidentals: 2
quarter_note: 1
eighth_note: 1
half_note: 0
time_signature: 3
single_clef: false
"#;

        let prefs = Preferences::from_yaml(yaml).unwrap();
        assert_eq!(prefs.get_int("clefs_mask", -1), 3);
        assert_eq!(prefs.get_int("missing", 7), 7);

        let config = GenerationConfig::from_preferences(&prefs).unwrap();
        assert!(config.clefs.contains(Clef::Treble));
        assert!(config.clefs.contains(Clef::Bass));
        assert_eq!(config.bounds_for(Clef::Treble), PitchBounds::new(60, 77));
        assert_eq!(config.bounds_for(Clef::Bass), PitchBounds::new(43, 57));
        assert_eq!(config.key_signature.kind(), SignatureKind::Sharps);
        assert_eq!(config.key_signature.count(), 2);
        assert_eq!(
            config.note_types,
            vec![NoteType::Whole, NoteType::Quarter, NoteType::Eighth, NoteType::Silence]
        );
        assert_eq!(config.time_signature, TimeSignature::new(6, 8));
        assert_eq!(config.playback, PlaybackMode::Random);
    }

    #[test]
    fn test_default_values() {
        let config = GenerationConfig::from_preferences(&Preferences::new()).unwrap();
        assert_eq!(config, GenerationConfig::default());
        assert_eq!(config.bounds_for(Clef::Alto), PitchBounds::new(53, 67));
        assert_eq!(config.bounds_for(Clef::Tenor), PitchBounds::new(50, 64));
    }

    #[test]
    fn test_toml_preferences() {
        let text = r#"
clefs_mask = 4
accidentals = 9
sequential = true
time_signature = "5"
"#;
        let prefs = Preferences::from_toml(text).unwrap();
        let config = GenerationConfig::from_preferences(&prefs).unwrap();
        assert_eq!(config.clefs, ClefMask::only(Clef::Alto));
        assert_eq!(config.key_signature.kind(), SignatureKind::Flats);
        assert_eq!(config.key_signature.count(), 2);
        assert_eq!(config.playback, PlaybackMode::Sequential);
        assert_eq!(config.time_signature, TimeSignature::new(3, 8));
    }

    #[test]
    fn test_invalid_accidentals() {
        let mut prefs = Preferences::new();
        prefs.set_int(keys::ACCIDENTALS, 20);
        assert!(matches!(
            GenerationConfig::from_preferences(&prefs),
            Err(GeneratorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_time_signatures() {
        assert_eq!(TimeSignature::from_index(-1), TimeSignature::new(4, 4));
        assert_eq!(TimeSignature::from_index(4), TimeSignature::new(6, 4));
        assert_eq!(TimeSignature::from_index(42), TimeSignature::new(4, 4));
        assert_eq!(TimeSignature::new(6, 8).measure_beats(), 3.0);
        assert_eq!(TimeSignature::new(3, 8).measure_beats(), 1.5);
        assert_eq!(TimeSignature::new(3, 4).measure_beats(), 3.0);
        assert_eq!(TimeSignature::new(6, 8).to_string(), "6/8");
    }

    #[test]
    fn test_round_trip() {
        let mut prefs = Preferences::new();
        prefs.set_int(keys::CLEFS_MASK, 5);
        prefs.set_bool(keys::SINGLE_CLEF, true);

        let yaml = prefs.to_yaml().unwrap();
        let parsed = Preferences::from_yaml(&yaml).unwrap();
        assert_eq!(prefs, parsed);
        assert!(parsed.get_bool(keys::SINGLE_CLEF, false));
    }

    #[test]
    fn test_config_serde() {
        let yaml = r#"
clefs: 2
key_signature:
  kind: flats
  count: 3
note_types: [quarter, eighth]
playback: sequential
"#;
        let config: GenerationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.clefs, ClefMask::only(Clef::Bass));
        assert_eq!(config.key_signature.count(), 3);
        assert_eq!(config.note_types, vec![NoteType::Quarter, NoteType::Eighth]);
        assert_eq!(config.playback, PlaybackMode::Sequential);
        assert_eq!(config.time_signature, TimeSignature::default());
    }

    #[test]
    fn test_config_rejects_oversized_signature() {
        let yaml = "key_signature:\n  kind: sharps\n  count: 12\n";
        assert!(serde_yaml::from_str::<GenerationConfig>(yaml).is_err());
    }
}
