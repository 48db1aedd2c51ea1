pub mod unsplash;

pub use unsplash::{PhotoSource, UnsplashClient, UpstreamError};
