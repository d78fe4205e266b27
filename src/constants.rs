pub const DEFAULT_API_PORT: u16 = 8000;

// leaderboard
pub const LEADERBOARD_SIZE: usize = 10;
pub const WEEK_WINDOW_DAYS: i64 = 7;
pub const MONTH_WINDOW_DAYS: i64 = 30;

// history/listing limits
pub const DETECTION_HISTORY_LIMIT: i64 = 50;
pub const VOICE_HISTORY_LIMIT: i64 = 20;
pub const DEFAULT_RECENT_DISPOSALS: i64 = 5;
pub const MAX_RECENT_DISPOSALS: i64 = 100;

// dashboard windows
pub const RECENT_SCANS_DAYS: i64 = 30;
pub const WEEKLY_BREAKDOWN_DAYS: i64 = 7;

/// kg of CO2 saved per recycled item
pub const CO2_PER_RECYCLED_ITEM: f64 = 0.5;
pub const CONFIDENCE_SCORE_WEIGHT: f64 = 10.0;
pub const YEARLY_PROJECTION_FACTOR: f64 = 12.0;

// vision model
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "qwen/qwen2.5-vl-32b-instruct:free";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const APP_TITLE: &str = "Smart EcoBin";
pub const VISION_MAX_TOKENS: u32 = 500;
pub const VISION_TEMPERATURE: f32 = 0.2;

// text-to-speech
pub const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_VOICE_ID: &str = "9BWtsMINqrJLrRacOk9x";
pub const SPEECH_MODEL_ID: &str = "eleven_turbo_v2_5";
pub const SPEECH_STABILITY: f32 = 0.5;
pub const SPEECH_SIMILARITY_BOOST: f32 = 0.75;
