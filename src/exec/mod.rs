pub mod client;
pub mod permission;
pub mod request;
pub mod streams;
