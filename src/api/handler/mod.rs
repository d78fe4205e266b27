pub mod analytics;
pub mod detection;
pub mod disposals;
pub mod profiles;
pub mod voice;
