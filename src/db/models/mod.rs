pub mod analytics;
pub mod detection;
pub mod disposal;
pub mod feedback;
pub mod profile;
pub mod user;
pub mod voice;
