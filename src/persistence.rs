use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreSaveError {
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("score record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerIdentity(String);

impl PlayerIdentity {
    pub fn new(name: &str) -> Result<Self, ScoreSaveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoreSaveError::EmptyPlayerName);
        }
        Ok(PlayerIdentity(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player: String,
    pub score: u32,
    pub elapsed_ms: u64,
    pub recorded_at: u64, // Seconds since the Unix epoch
}

pub trait ScoreStore: Send + Sync + 'static {
    fn save(&self, record: &ScoreRecord) -> Result<(), ScoreSaveError>;
}

pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonLinesStore { path: path.into() }
    }

    pub fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, ScoreSaveError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ScoreRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable score line: {}", e),
            }
        }
        records.sort_by(|a, b| b.score.cmp(&a.score).then(b.elapsed_ms.cmp(&a.elapsed_ms)));
        records.truncate(limit);
        Ok(records)
    }
}

impl ScoreStore for JsonLinesStore {
    fn save(&self, record: &ScoreRecord) -> Result<(), ScoreSaveError> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(ScoreRecord),
    Failed(String),
}

/// Receives the final result when a session ends. Must return immediately.
pub trait ScoreReporter {
    fn report(&mut self, score: u32, elapsed: Duration);
}

pub struct DetachedReporter<S: ScoreStore> {
    identity: Option<PlayerIdentity>,
    store: Arc<S>,
    outcomes: Sender<SaveOutcome>,
}

impl<S: ScoreStore> DetachedReporter<S> {
    pub fn new(identity: Option<PlayerIdentity>, store: Arc<S>, outcomes: Sender<SaveOutcome>) -> Self {
        DetachedReporter {
            identity,
            store,
            outcomes,
        }
    }
}

impl<S: ScoreStore> ScoreReporter for DetachedReporter<S> {
    fn report(&mut self, score: u32, elapsed: Duration) {
        let Some(identity) = &self.identity else {
            warn!("No signed-in player; score {} not saved.", score);
            return;
        };

        let record = ScoreRecord {
            player: identity.name().to_string(),
            score,
            elapsed_ms: elapsed.as_millis() as u64,
            recorded_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        let store = Arc::clone(&self.store);
        let outcomes = self.outcomes.clone();

        let spawned = thread::Builder::new()
            .name("score-save".into())
            .spawn(move || {
                let outcome = match store.save(&record) {
                    Ok(()) => {
                        info!("Saved score {} for {}", record.score, record.player);
                        SaveOutcome::Saved(record)
                    }
                    Err(e) => {
                        error!("Failed to save score: {}", e);
                        SaveOutcome::Failed(e.to_string())
                    }
                };
                // The receiver may be gone if the player already quit.
                let _ = outcomes.send(outcome);
            });

        if let Err(e) = spawned {
            error!("Failed to start score save: {}", e);
            let _ = self.outcomes.send(SaveOutcome::Failed(e.to_string()));
        }
    }
}
