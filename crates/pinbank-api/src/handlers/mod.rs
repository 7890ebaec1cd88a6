//! API request handlers

pub mod auth;
pub mod health;
pub mod transfer;
pub mod user;
