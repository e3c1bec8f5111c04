//! Thin Telegram Bot API client over reqwest.

use serde_json::{json, Value};

use crate::error::{BotError, Result};

/// One incoming update the bot cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Message {
        update_id: i64,
        chat_id: i64,
        text: String,
        first_name: String,
        username: Option<String>,
    },
    Callback {
        update_id: i64,
        callback_id: String,
        data: String,
        chat_id: i64,
        message_id: i64,
        first_name: String,
        username: Option<String>,
    },
}

impl Update {
    pub fn update_id(&self) -> i64 {
        match self {
            Update::Message { update_id, .. } | Update::Callback { update_id, .. } => *update_id,
        }
    }
}

/// Result of one `getUpdates` call. `last_update_id` also counts updates
/// that were skipped (stickers, edits), so the offset always advances.
#[derive(Debug, Default)]
pub struct UpdateBatch {
    pub updates: Vec<Update>,
    pub last_update_id: Option<i64>,
}

#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(api_base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Fetch pending updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<UpdateBatch> {
        let resp = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", "0".to_string()),
                ("allowed_updates", "[\"message\",\"callback_query\"]".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(api_error("getUpdates", status.as_u16(), &text));
        }

        let body: Value = serde_json::from_str(&text)?;
        Ok(parse_updates(&body))
    }

    pub async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.call("answerCallbackQuery", json!({ "callback_query_id": callback_id }))
            .await
    }

    pub async fn send_message(&self, chat_id: &str, text: &str, keyboard: Option<&Value>) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = kb.clone();
        }
        self.call("sendMessage", body).await
    }

    /// Replace the text (and keyboard) of a message the bot sent earlier.
    pub async fn edit_message(
        &self,
        chat_id: &str,
        message_id: i64,
        text: &str,
        keyboard: Option<&Value>,
    ) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = kb.clone();
        }
        self.call("editMessageText", body).await
    }

    async fn call(&self, method: &str, body: Value) -> Result<()> {
        let resp = self.client.post(self.method_url(method)).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await?;
            return Err(api_error(method, status.as_u16(), &text));
        }
        Ok(())
    }
}

/// Error for a non-2xx response. Telegram explains failures in the
/// `description` field; anything else is passed through as is.
fn api_error(method: &str, status: u16, body: &str) -> BotError {
    let description = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("description").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    BotError::Telegram {
        method: method.to_string(),
        status,
        description,
    }
}

/// Extract messages and button presses from a `getUpdates` response.
pub fn parse_updates(body: &Value) -> UpdateBatch {
    let mut batch = UpdateBatch::default();
    let results = &mut batch.updates;

    let Some(updates) = body.get("result").and_then(|r| r.as_array()) else {
        return batch;
    };

    for update in updates {
        let Some(update_id) = update.get("update_id").and_then(|u| u.as_i64()) else {
            continue;
        };
        batch.last_update_id = Some(batch.last_update_id.map_or(update_id, |m| m.max(update_id)));

        // Button press
        if let Some(cb) = update.get("callback_query") {
            let callback_id = str_field(cb, "id");
            let data = str_field(cb, "data");
            let message = cb.get("message");
            let chat_id = message
                .and_then(|m| m.get("chat"))
                .and_then(|c| c.get("id"))
                .and_then(|id| id.as_i64())
                .unwrap_or(0);
            let message_id = message
                .and_then(|m| m.get("message_id"))
                .and_then(|id| id.as_i64())
                .unwrap_or(0);
            let (first_name, username) = sender(cb.get("from"));

            if !data.is_empty() && chat_id != 0 {
                results.push(Update::Callback {
                    update_id,
                    callback_id,
                    data,
                    chat_id,
                    message_id,
                    first_name,
                    username,
                });
            }
            continue;
        }

        if let Some(msg) = update.get("message") {
            let text = str_field(msg, "text");
            let chat_id = msg
                .get("chat")
                .and_then(|c| c.get("id"))
                .and_then(|id| id.as_i64())
                .unwrap_or(0);
            let (first_name, username) = sender(msg.get("from"));

            if !text.is_empty() && chat_id != 0 {
                results.push(Update::Message {
                    update_id,
                    chat_id,
                    text,
                    first_name,
                    username,
                });
            }
        }
    }

    batch
}

fn str_field(v: &Value, key: &str) -> String {
    v.get(key).and_then(|s| s.as_str()).unwrap_or("").to_string()
}

fn sender(from: Option<&Value>) -> (String, Option<String>) {
    match from {
        Some(f) => (
            str_field(f, "first_name"),
            f.get("username").and_then(|u| u.as_str()).map(str::to_string),
        ),
        None => (String::new(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_messages_and_callbacks() {
        let body = json!({
            "ok": true,
            "result": [
                {
                    "update_id": 10,
                    "message": {
                        "message_id": 1,
                        "from": { "id": 5, "first_name": "Анна", "username": "anna" },
                        "chat": { "id": 5, "type": "private" },
                        "text": "/start"
                    }
                },
                {
                    "update_id": 11,
                    "callback_query": {
                        "id": "cb-1",
                        "from": { "id": 5, "first_name": "Анна" },
                        "message": { "message_id": 77, "chat": { "id": 5 } },
                        "data": "calculator"
                    }
                },
                {
                    "update_id": 12,
                    "message": { "chat": { "id": 5 }, "sticker": {} }
                }
            ]
        });

        let batch = parse_updates(&body);
        assert_eq!(batch.last_update_id, Some(12));
        let updates = batch.updates;
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[0],
            Update::Message {
                update_id: 10,
                chat_id: 5,
                text: "/start".into(),
                first_name: "Анна".into(),
                username: Some("anna".into()),
            }
        );
        assert_eq!(
            updates[1],
            Update::Callback {
                update_id: 11,
                callback_id: "cb-1".into(),
                data: "calculator".into(),
                chat_id: 5,
                message_id: 77,
                first_name: "Анна".into(),
                username: None,
            }
        );
        assert_eq!(updates[1].update_id(), 11);
    }

    #[test]
    fn malformed_body_yields_nothing() {
        let batch = parse_updates(&json!({ "ok": false }));
        assert!(batch.updates.is_empty());
        assert_eq!(batch.last_update_id, None);
    }

    #[test]
    fn api_errors_carry_telegram_description() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: message is not modified"}"#;
        match api_error("editMessageText", 400, body) {
            BotError::Telegram { method, status, description } => {
                assert_eq!(method, "editMessageText");
                assert_eq!(status, 400);
                assert_eq!(description, "Bad Request: message is not modified");
            }
            other => panic!("unexpected error {other:?}"),
        }

        match api_error("getUpdates", 502, "Bad Gateway\n") {
            BotError::Telegram { description, .. } => assert_eq!(description, "Bad Gateway"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn method_urls_include_token() {
        let api = TelegramApi::new("https://api.telegram.org/", "123:abc");
        assert_eq!(api.method_url("getUpdates"), "https://api.telegram.org/bot123:abc/getUpdates");
    }
}
