pub mod admin_service;
pub mod bot_api;
pub mod client_log_service;
pub mod content_service;
pub mod message_service;
pub mod user_service;
