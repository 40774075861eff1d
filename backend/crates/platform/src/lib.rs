//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (bcrypt) and password policy
//! - Bearer token issuing and verification (HS256 JWT)
//! - Client identification (IP address behind proxies)
//! - Rate limiting infrastructure

pub mod client;
pub mod password;
pub mod rate_limit;
pub mod token;
