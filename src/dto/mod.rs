pub mod envelope;
pub mod user_dto;
