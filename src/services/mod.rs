//! Business logic services shared by the route handlers.

pub mod auth;
pub mod session;
pub mod steps;
pub mod suggest;
