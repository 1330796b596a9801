pub mod health;
pub mod source_audio;
