pub mod api;
pub mod app;
pub mod codec;
pub mod config;
pub mod models;
pub mod redirect;
pub mod service;
pub mod storage;

pub use app::create_app;
pub use service::{LinkService, ServiceError};
