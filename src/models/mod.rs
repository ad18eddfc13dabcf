pub mod link;

pub use link::{LinkRecord, LinkStats, ShortenRequest, ShortenResponse, ShortenedLink};
