pub mod config;
pub mod invoker;
pub mod relocate;
pub mod scheme;
pub mod staging;
