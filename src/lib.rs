pub mod activity;
pub mod aggregate;
pub mod chat;
pub mod common;
pub mod data_loader;
pub mod export;
pub mod feedback;
pub mod index;
pub mod plan;
pub mod plan_execution;
pub mod snapshot;
