pub mod chat_service;
pub mod check_in_service;
pub mod match_service;
pub mod milestone_service;
pub mod verification_service;
