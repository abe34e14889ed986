pub mod access;
pub mod admin;
pub mod auth;
pub mod members;
pub mod payments;
pub mod public;
pub mod root;
