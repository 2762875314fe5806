pub mod ai_match;
pub mod check_in;
pub mod mint_nft;
pub mod projects;
