pub mod config;
pub mod data_storage;
pub mod secret;
pub mod task;
