//! Routinely: user account API plus server-rendered client shell.

pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod extract;
pub mod middleware;
pub mod render;
pub mod state;
pub mod users;
