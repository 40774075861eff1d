//! Value Object Module

pub mod email;
pub mod nickname;
pub mod profile_field;
pub mod user_id;
pub mod user_password;
pub mod vector_status;
