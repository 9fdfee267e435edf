pub mod client_log;
pub mod content;
pub mod message;
pub mod user;
