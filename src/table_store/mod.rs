pub mod client;
pub mod entity;
pub mod signature;

pub use client::{StoreError, TableStore};
