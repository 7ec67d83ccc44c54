pub mod engine;
pub mod errors;
pub mod models;
pub mod render;
pub mod request;
