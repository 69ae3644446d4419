pub mod check;
pub mod classify;
pub mod config;
pub mod route;
