pub mod http;
pub mod seed;
