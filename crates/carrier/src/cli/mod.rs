pub mod app;
pub mod get;
