pub mod openai;
pub mod solana;
pub mod validate_utils;
