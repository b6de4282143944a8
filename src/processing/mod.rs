pub mod file;
pub mod line;
