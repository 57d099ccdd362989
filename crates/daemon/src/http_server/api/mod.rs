pub mod client;
pub mod document;
