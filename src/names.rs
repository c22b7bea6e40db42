pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Quiz session defaults
pub const QUESTIONS_PER_QUIZ: usize = 6;
pub const OPTIONS_PER_QUESTION: usize = 4;
pub const POINTS_PER_QUESTION: u32 = 5;
pub const QUESTION_TIME_LIMIT: u32 = 25;

// Progressive difficulty thresholds (all-time completed attempts)
pub const MEDIUM_AFTER: usize = 3;
pub const HARD_AFTER: usize = 7;
pub const EXPERT_AFTER: usize = 15;
pub const ADAPTIVE_AFTER: usize = 30;

// Global configuration singleton
pub const CONFIG_KEY: &str = "config";
pub const DEFAULT_MAX_QUESTIONS_PER_QUIZ: u32 = 10;

// Store connection policy
pub const MAX_CONNECT_ATTEMPTS: u32 = 3;
pub const CONNECT_RETRY_DELAY_SECS: u64 = 2;
