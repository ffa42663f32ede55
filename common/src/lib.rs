pub mod address;
pub mod alert;
pub mod config;
pub mod receive;
pub mod reveal;
pub mod scramble;
pub mod seed_store;
pub mod wallet;
