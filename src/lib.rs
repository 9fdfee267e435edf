pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use reqwest::Client;
use sqlx::PgPool;

use crate::auth::{InitDataVerifier, SessionTokenService};
use crate::services::{
    admin_service::AdminService, bot_api::BotApi, client_log_service::ClientLogService,
    content_service::ContentService, message_service::MessageService, user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub admin_service: AdminService,
    pub content_service: ContentService,
    pub message_service: MessageService,
    pub client_log_service: ClientLogService,
    pub bot_api: BotApi,
    pub init_data_verifier: InitDataVerifier,
    pub session_service: SessionTokenService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let user_service = UserService::new(pool.clone());
        let admin_service = AdminService::new(pool.clone());
        let content_service = ContentService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let client_log_service = ClientLogService::new(pool.clone());
        let bot_api = BotApi::new(config.telegram_bot_token.clone(), http_client);
        let init_data_verifier = InitDataVerifier::new(config.telegram_bot_token.clone());
        let session_service = SessionTokenService::new(config.session_secret.clone());

        Self {
            pool,
            user_service,
            admin_service,
            content_service,
            message_service,
            client_log_service,
            bot_api,
            init_data_verifier,
            session_service,
        }
    }
}
