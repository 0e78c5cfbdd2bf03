pub mod markdown;
pub mod terminal;
