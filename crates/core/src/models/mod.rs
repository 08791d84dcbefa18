pub mod image;
pub mod journal;
pub mod prediction;
pub mod record;
pub mod settings;
pub mod stats;
