pub mod audio;
pub mod source;
