pub mod app;
pub mod auth;
pub mod config;
pub mod consts;
pub mod endpoint;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;
pub mod translate;
pub mod vertex_client;

#[cfg(test)]
mod test_utils;
