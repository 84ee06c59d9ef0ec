pub mod client;

pub use client::YouTubeHttpAdapter;
