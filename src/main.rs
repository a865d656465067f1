// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calao::music::alteration;
use calao::{ClefSelector, GenerationConfig, Harmony, Note, NoteGenerator};

fn print_usage() {
    println!("CALAO - Random note generator for ear training");
    println!();
    println!("Usage: calao [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --prefs <FILE>          Load preferences from a YAML or TOML file");
    println!("  --seed <N>              Seed the random source for reproducible output");
    println!("  --sequence <MEASURES>   Generate MEASURES full measures of notes");
    println!("  --rhythm <MEASURES>     Generate a rhythm-only sequence");
    println!("  --note                  Draw a single note with a random accidental");
    println!("  --chord                 Draw a random major or minor triad");
    println!("  --interval <DEGREE>     Draw a random interval of DEGREE (2..8)");
    println!("  --ranges                List the notes available to the generator");
    println!("  --help                  Show this help message");
}

enum Command {
    Sequence { measures: usize, rhythm_only: bool },
    Note,
    Harmony(Harmony),
    Ranges,
}

struct Options {
    prefs: Option<PathBuf>,
    seed: Option<u64>,
    command: Option<Command>,
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options {
        prefs: None,
        seed: None,
        command: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(None),
            "--prefs" => {
                options.prefs = Some(PathBuf::from(value_of(args, i, flag)?));
                i += 1;
            }
            "--seed" => {
                let value = value_of(args, i, flag)?;
                options.seed = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow!("Invalid seed: {}", value))?,
                );
                i += 1;
            }
            "--sequence" | "--rhythm" => {
                let value = value_of(args, i, flag)?;
                let measures = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid measure count: {}", value))?;
                options.command = Some(Command::Sequence {
                    measures,
                    rhythm_only: flag == "--rhythm",
                });
                i += 1;
            }
            "--note" => options.command = Some(Command::Note),
            "--chord" => options.command = Some(Command::Harmony(Harmony::Chord)),
            "--interval" => {
                let value = value_of(args, i, flag)?;
                let degree = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid interval degree: {}", value))?;
                options.command = Some(Command::Harmony(Harmony::Interval(degree)));
                i += 1;
            }
            "--ranges" => options.command = Some(Command::Ranges),
            _ => return Err(anyhow!("Unknown option: {}", flag)),
        }
        i += 1;
    }

    Ok(Some(options))
}

fn accidental(alt: i8) -> &'static str {
    match alt {
        alteration::FLAT => "b",
        alteration::SHARP => "#",
        alteration::NATURAL => "nat",
        _ => "",
    }
}

fn print_note(note: &Note) {
    println!(
        "{:>7.3}  {:<14} {:<6} pitch {:>3}{:<3}  level {:>3}{}",
        note.timestamp,
        note.note_type.to_string(),
        note.clef.to_string(),
        note.pitch,
        accidental(note.alteration),
        note.level,
        if note.triplet_value != 0 {
            format!("  triplet {}", note.triplet_value)
        } else {
            String::new()
        }
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("CALAO - Random note generator for ear training");
        println!("Run with --help for usage information");
        return Ok(());
    }

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let config = match &options.prefs {
        Some(path) => {
            info!("Loading preferences from {:?}", path);
            GenerationConfig::load(path)?
        }
        None => GenerationConfig::default(),
    };

    let mut generator = match options.seed {
        Some(seed) => NoteGenerator::with_seed(&config, seed)?,
        None => NoteGenerator::new(&config)?,
    };

    match options.command.unwrap_or(Command::Ranges) {
        Command::Sequence {
            measures,
            rhythm_only,
        } => {
            println!(
                "{} measure(s) in {} ({})",
                measures,
                generator.time_signature(),
                generator.table().signature()
            );
            for note in generator.random_sequence(measures, rhythm_only, ClefSelector::Any)? {
                print_note(&note);
            }
        }
        Command::Note => {
            let note = generator.random_note(None, true, ClefSelector::Any)?;
            print_note(&note);
        }
        Command::Harmony(harmony) => {
            let mut seq = Vec::new();
            let quality = generator.random_chord_or_interval(&mut seq, 0, harmony)?;
            println!("{:?}, quality {}", harmony, quality);
            for note in &seq {
                print_note(note);
            }
        }
        Command::Ranges => {
            println!(
                "{} note(s) on {} staff(s), {}",
                generator.notes_number(),
                generator.clefs_number(),
                generator.table().signature()
            );
            for note in generator.ranges().entries() {
                print_note(note);
            }
        }
    }

    Ok(())
}
