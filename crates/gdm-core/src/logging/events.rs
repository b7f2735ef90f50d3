//! Structured event names.
//!
//! Every event carries an `event` field with one of these names so JSONL logs
//! can be filtered without parsing messages.

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Configuration
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    // Model compilation
    pub const MODEL_COMPILED: &str = "model.compiled";
    pub const NORMALIZE_DEGENERATE_SD: &str = "normalize.degenerate_sd";

    // Scoring
    pub const INPUT_CLAMPED: &str = "input.clamped";
    pub const SCORE_EVALUATED: &str = "score.evaluated";

    // Batch
    pub const BATCH_ROW_FAILED: &str = "batch.row_failed";
    pub const BATCH_FINISHED: &str = "batch.finished";
}
