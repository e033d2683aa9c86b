pub mod approval;
pub mod client;
pub mod config;
pub mod contracts;
pub mod menu;
pub mod task;
pub mod wallet;
