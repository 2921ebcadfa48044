pub mod document;
pub mod policy;
pub mod prompt;
