pub mod images;
pub mod prompt;
pub mod providers;
