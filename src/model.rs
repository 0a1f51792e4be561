pub mod content;
pub mod object;
