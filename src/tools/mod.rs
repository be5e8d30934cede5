pub mod http;

pub use http::{agent, post_json};
