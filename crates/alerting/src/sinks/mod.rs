pub mod bot_api;
pub mod chat_webhook;
pub mod generic_webhook;

pub use bot_api::BotApiSink;
pub use chat_webhook::ChatWebhookSink;
pub use generic_webhook::GenericWebhookSink;
