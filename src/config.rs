// Configuration module for reading Snake.toml
// All tunable parameters are carried in one explicit `Config` value that is passed
// down to the search; nothing reads global state at decision time.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Deepest search the beam search supports
pub const MAX_SEARCH_DEPTH: u8 = 2;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub weights: Weights,
    pub scores: ScoresConfig,
    pub selection: SelectionConfig,
    pub game_rules: GameRulesConfig,
    pub debug: DebugConfig,
}

/// Timing constants
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimingConfig {
    /// Soft budget for the root-move loop; checked after each root move
    pub deadline_ms: u64,
}

/// Beam search shape
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SearchConfig {
    pub depth: u8,
    pub beam_width: usize,
    pub opponent_branch_factor: usize,
}

/// Evaluator weights, one per heuristic term
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Weights {
    pub area: f64,
    pub food: f64,
    pub corridor: f64,
    pub hazard: f64,
    pub h2h: f64,
    pub center: f64,
    pub degree: f64,
    pub longer: f64,
    pub stability: f64,
    pub voronoi: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            area: 3.5,
            food: 45.0,
            corridor: 3.0,
            hazard: 0.0,
            h2h: 4.0,
            center: 0.08,
            degree: 0.9,
            longer: 5.0,
            stability: 2.0,
            voronoi: 0.8,
        }
    }
}

/// Scoring constants outside the weight vector
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScoresConfig {
    /// Health strictly below this counts as hungry
    pub health_low_threshold: i32,
    /// Subtracted from the current evaluation for dead-end branches
    pub losing_branch_penalty: f64,
    /// Per-segment bias in the opponent plausibility ranking
    pub opponent_length_bias: f64,
}

/// Randomized tie-break selection
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SelectionConfig {
    pub tie_candidate_count: usize,
    pub tie_margin: f64,
    pub base_seed: u64,
}

/// Game rules constants
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GameRulesConfig {
    pub health_on_food: i32,
    pub health_loss_per_turn: i32,
    pub hazard_damage: i32,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        GameRulesConfig {
            health_on_food: 100,
            health_loss_per_turn: 1,
            hazard_damage: 15,
        }
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig { deadline_ms: 250 },
            search: SearchConfig {
                depth: 2,
                beam_width: 3,
                opponent_branch_factor: 2,
            },
            weights: Weights::default(),
            scores: ScoresConfig {
                health_low_threshold: 35,
                losing_branch_penalty: 100.0,
                opponent_length_bias: 0.1,
            },
            selection: SelectionConfig {
                tie_candidate_count: 2,
                tie_margin: 0.02,
                base_seed: 42,
            },
            game_rules: GameRulesConfig::default(),
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error,
    /// then applies environment overrides
    pub fn load_or_default() -> Self {
        let config = Self::load_default().unwrap_or_else(|e| {
            eprintln!("Warning: Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        });

        let mut overridden = config.clone();
        match overridden.apply_env_overrides() {
            Ok(()) => overridden,
            Err(e) => {
                eprintln!("Warning: Ignoring environment overrides ({})", e);
                config
            }
        }
    }

    /// Applies overrides from process environment variables
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies named scalar overrides from `lookup`.
    ///
    /// Recognised keys: `LOW_HEALTH`, `W_AREA`, `W_FOOD`, `W_CORRIDOR`, `W_HAZARD`,
    /// `W_H2H`, `W_CENTER`, `W_DEGREE`, `W_LONGER`, `W_STABILITY`, `W_VORONOI`,
    /// `TOPK_RANDOM`, `TIE_MARGIN`, `SEED`, `FALLBACK_MS`, `LOOKAHEAD_DEPTH`,
    /// `BEAM_WIDTH`, `OPP_TOPK`. A value that fails to parse is an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn set<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
            target: &mut T,
        ) -> Result<(), String> {
            if let Some(raw) = lookup(key) {
                *target = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid value for {}: '{}'", key, raw))?;
            }
            Ok(())
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
        set(lookup, "LOW_HEALTH", &mut self.scores.health_low_threshold)?;
        set(lookup, "W_AREA", &mut self.weights.area)?;
        set(lookup, "W_FOOD", &mut self.weights.food)?;
        set(lookup, "W_CORRIDOR", &mut self.weights.corridor)?;
        set(lookup, "W_HAZARD", &mut self.weights.hazard)?;
        set(lookup, "W_H2H", &mut self.weights.h2h)?;
        set(lookup, "W_CENTER", &mut self.weights.center)?;
        set(lookup, "W_DEGREE", &mut self.weights.degree)?;
        set(lookup, "W_LONGER", &mut self.weights.longer)?;
        set(lookup, "W_STABILITY", &mut self.weights.stability)?;
        set(lookup, "W_VORONOI", &mut self.weights.voronoi)?;
        set(lookup, "TOPK_RANDOM", &mut self.selection.tie_candidate_count)?;
        set(lookup, "TIE_MARGIN", &mut self.selection.tie_margin)?;
        set(lookup, "SEED", &mut self.selection.base_seed)?;
        set(lookup, "FALLBACK_MS", &mut self.timing.deadline_ms)?;
        set(lookup, "LOOKAHEAD_DEPTH", &mut self.search.depth)?;
        set(lookup, "BEAM_WIDTH", &mut self.search.beam_width)?;
        set(lookup, "OPP_TOPK", &mut self.search.opponent_branch_factor)?;

        self.validate()
    }

    /// Rejects values the search cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.search.depth > MAX_SEARCH_DEPTH {
            return Err(format!(
                "search.depth must be at most {}, got {}",
                MAX_SEARCH_DEPTH, self.search.depth
            ));
        }
        if self.search.beam_width == 0 {
            return Err("search.beam_width must be at least 1".to_string());
        }
        if self.search.opponent_branch_factor == 0 {
            return Err("search.opponent_branch_factor must be at least 1".to_string());
        }
        if self.selection.tie_candidate_count == 0 {
            return Err("selection.tie_candidate_count must be at least 1".to_string());
        }
        if self.selection.tie_margin.is_nan() || self.selection.tie_margin < 0.0 {
            return Err(format!(
                "selection.tie_margin must be non-negative, got {}",
                self.selection.tie_margin
            ));
        }
        Ok(())
    }
}
