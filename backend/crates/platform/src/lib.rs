//! Platform Crate - Technical Infrastructure
//!
//! Domain-agnostic building blocks shared by the service crates:
//! - Cryptographic utilities (SHA-256, random tokens, Base64url)
//! - HMAC-signed JWT encoding and verification
//! - Password hashing (Argon2id, NIST SP 800-63B policy)
//! - `Authorization: Bearer` header parsing

pub mod bearer;
pub mod crypto;
pub mod jwt;
pub mod password;
