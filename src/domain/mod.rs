pub mod change_request;
pub mod diff;
pub mod document;
pub mod research;
