pub mod client;

pub use client::{FetchError, UnsplashClient, UnsplashClientOptions};
