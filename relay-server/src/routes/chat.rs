use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::chat;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: Option<String>,
}

/// POST /api/chat
pub async fn send_message(Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    tracing::debug!(user_id = ?req.user_id, "chat message");
    Json(ChatResponse {
        response: chat::reply(&req.message),
        user_id: req.user_id,
    })
}

/// POST /api/webhook/telegram
///
/// Text messages are answered inline with a `sendMessage` method call in the
/// webhook response; every other update is acknowledged.
pub async fn telegram_webhook(Json(update): Json<Value>) -> Json<Value> {
    let message = &update["message"];
    let text = message["text"].as_str();
    let chat_id = message["chat"]["id"].as_i64();

    match (text, chat_id) {
        (Some(text), Some(chat_id)) => {
            tracing::debug!(update_id = ?update["update_id"].as_i64(), chat_id, "telegram message");
            Json(json!({
                "method": "sendMessage",
                "chat_id": chat_id,
                "text": chat::reply(text),
            }))
        }
        _ => Json(json!({ "ok": true })),
    }
}
