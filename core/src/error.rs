use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Ledger ─────────────────────────────────────
    #[error("Unknown resource '{resource}'")]
    UnknownResource { resource: String },

    #[error("Insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource { resource: String, needed: u32, available: u32 },

    #[error("Insufficient energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: u32, available: u32 },

    // ── Persistence ────────────────────────────────
    #[error("Save blob could not be decoded: {reason}")]
    DecodeFailure { reason: String },

    #[error("Snapshot could not be encoded: {reason}")]
    EncodeFailure { reason: String },

    // ── Skills ─────────────────────────────────────
    #[error("Unknown skill '{skill}'")]
    UnknownSkill { skill: String },

    #[error("Unknown skill-tree skill '{id}'")]
    UnknownTreeSkill { id: String },

    #[error("Requirements not met for '{id}': {detail}")]
    RequirementsNotMet { id: String, detail: String },

    #[error("'{id}' is already at max level {max_level}")]
    MaxLevelReached { id: String, max_level: u32 },

    #[error("Insufficient experience: need {needed}, have {available}")]
    InsufficientExperience { needed: u64, available: u64 },

    // ── Content lookups ────────────────────────────
    #[error("Unknown recipe '{id}'")]
    UnknownRecipe { id: String },

    #[error("Unknown exploration region '{id}'")]
    UnknownRegion { id: String },

    #[error("Unknown building '{id}'")]
    UnknownBuilding { id: String },

    #[error("Unknown technology '{id}'")]
    UnknownTechnology { id: String },

    #[error("Unknown merchant '{id}'")]
    UnknownMerchant { id: String },

    #[error("Merchant '{id}' is not in camp today")]
    MerchantUnavailable { id: String },

    #[error("'{item}' is out of stock at '{merchant}'")]
    OutOfStock { merchant: String, item: String },

    // ── Dice game ──────────────────────────────────
    #[error("Unknown buff id {id}")]
    UnknownBuff { id: u32 },

    #[error("No dice run in progress")]
    NoActiveRun,

    #[error("Dice run already finished after round {round}")]
    RunFinished { round: u32 },

    #[error("Selection of {selected} dice exceeds the limit of {limit}")]
    SelectionLimit { selected: usize, limit: usize },

    #[error("Invalid dice selection: {reason}")]
    InvalidSelection { reason: String },

    // ── Random events ──────────────────────────────
    #[error("No random event is awaiting a decision")]
    NoPendingEvent,

    #[error("Option {index} of event '{event}' is not available")]
    EventOptionUnavailable { event: String, index: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
