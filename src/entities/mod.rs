pub mod ai_match;
pub mod chat;
pub mod check_in;
pub mod milestone;
pub mod participant;
pub mod project;
