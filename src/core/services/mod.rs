pub mod broadcast;
pub mod transcription;
