// Asynchronous decision log
//
// Every decision is appended to a JSONL file from a fire-and-forget tokio task so
// the /move response never waits on disk. Each line carries the full snapshot, which
// is what the replay engine feeds back into the decision loop.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::bot::Decision;
use crate::types::{Direction, GameState};

/// One scored root move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "move")]
    pub direction: Direction,
    pub score: f64,
}

/// One line of the decision log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub turn: i32,
    pub game_id: String,
    pub chosen_move: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub elapsed_ms: u64,
    pub timestamp: String,
    pub snapshot: GameState,
}

impl DecisionLogEntry {
    /// Builds an entry stamped with the current UTC time
    pub fn new(snapshot: GameState, decision: &Decision) -> Self {
        DecisionLogEntry {
            turn: snapshot.turn,
            game_id: snapshot.game.id.clone(),
            chosen_move: decision.direction.as_str().to_string(),
            score: decision.score,
            candidates: decision
                .candidates
                .iter()
                .map(|&(direction, score)| Candidate { direction, score })
                .collect(),
            elapsed_ms: decision.elapsed_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
            snapshot,
        }
    }
}

/// Shared handle to the log file; clones write to the same file
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Opens (and truncates) `log_file_path` when `enabled`.
    /// Failing to open the file disables logging instead of failing startup.
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return DebugLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Decision log enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create decision log '{}': {}", log_file_path, e);
                DebugLogger::disabled()
            }
        }
    }

    /// A logger that drops everything
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues the decision for writing without waiting for it
    pub fn log_decision(&self, snapshot: GameState, decision: &Decision) {
        if !self.enabled {
            return;
        }

        let entry = DecisionLogEntry::new(snapshot, decision);
        let file_handle = self.file.clone();
        tokio::spawn(async move {
            Self::append(file_handle, &entry).await;
        });
    }

    /// Writes one entry and waits until it is flushed
    pub async fn record(&self, entry: &DecisionLogEntry) {
        if !self.enabled {
            return;
        }
        Self::append(self.file.clone(), entry).await;
    }

    async fn append(file_handle: Arc<Mutex<Option<File>>>, entry: &DecisionLogEntry) {
        let mut file_guard = file_handle.lock().await;
        let Some(file) = file_guard.as_mut() else {
            return;
        };

        let line = match serde_json::to_string(entry) {
            Ok(json_line) => format!("{}\n", json_line),
            Err(e) => {
                error!("Failed to serialize decision log entry: {}", e);
                return;
            }
        };

        if let Err(e) = file.write_all(line.as_bytes()).await {
            error!("Failed to write decision log entry: {}", e);
        } else if let Err(e) = file.flush().await {
            error!("Failed to flush decision log: {}", e);
        }
    }
}
