// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for hot-reloading exercise preferences.
//!
//! Modified preference files are debounced, reparsed and resolved into a
//! [`GenerationConfig`] on a background thread. Callers poll the events
//! and hand reloaded configurations to `NoteGenerator::update`.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use super::GenerationConfig;

/// Events emitted by the preferences watcher
#[derive(Debug, Clone)]
pub enum PreferencesEvent {
    /// A preferences file changed and resolved into a valid configuration
    Reloaded(Box<GenerationConfig>),
    /// A preferences file changed but could not be used
    Error(String),
}

/// Watches a preferences file (or a directory of them)
pub struct PreferencesWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<PreferencesEvent>,
    watched_path: PathBuf,
}

fn is_preferences_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("toml")
    )
}

fn reload(path: &Path) -> PreferencesEvent {
    match GenerationConfig::load(path) {
        Ok(config) => {
            info!("Reloaded preferences from {:?}", path);
            PreferencesEvent::Reloaded(Box::new(config))
        }
        Err(e) => {
            warn!("Failed to reload preferences {:?}: {:#}", path, e);
            PreferencesEvent::Error(format!("Failed to load {:?}: {:#}", path, e))
        }
    }
}

impl PreferencesWatcher {
    /// Start watching `path`.
    ///
    /// # Arguments
    /// * `path` - Preferences file or directory to watch
    /// * `debounce_ms` - Debounce duration in milliseconds (default: 500)
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(500));

        let (event_tx, event_rx): (Sender<PreferencesEvent>, Receiver<PreferencesEvent>) =
            mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        let mode = if watched_path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&watched_path, mode)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        let debounced_path = watched_path.clone();
        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let mut pending_paths: Vec<PathBuf> = Vec::new();

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(event) => {
                        if let EventKind::Modify(_) | EventKind::Create(_) = event.kind {
                            for path in event.paths {
                                if !pending_paths.contains(&path) {
                                    pending_paths.push(path);
                                }
                            }
                            last_event_time = Some(Instant::now());
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        let settled = last_event_time
                            .map(|t| t.elapsed() >= debounce_duration)
                            .unwrap_or(false);
                        if settled {
                            for path in pending_paths.drain(..) {
                                if is_preferences_file(&path) || path == debounced_path {
                                    debug!("Preferences changed: {:?}", path);
                                    let _ = event_tx.send(reload(&path));
                                }
                            }
                            last_event_time = None;
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&self) -> Option<PreferencesEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending events
    pub fn recv_all(&self) -> Vec<PreferencesEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

/// Load and resolve a preferences file without applying it
pub fn validate_preferences<P: AsRef<Path>>(path: P) -> Result<GenerationConfig> {
    GenerationConfig::load(path)
}
