//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::prompt::{system_prompt, user_context};
use super::{Assistant, AssistantError};
use crate::config::AssistantConfig;
use crate::pricing::CalculationResult;
use crate::tariffs::TariffBook;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Consultant backed by `POST {base_url}/chat/completions`.
pub struct OpenAiAssistant {
    client: reqwest::Client,
    config: AssistantConfig,
    api_key: String,
    system_prompt: String,
}

impl OpenAiAssistant {
    /// Fails with `NotConfigured` when no API key is set.
    pub fn new(config: AssistantConfig, book: &TariffBook) -> Result<Self, AssistantError> {
        let api_key = config.api_key.clone().ok_or(AssistantError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            system_prompt: system_prompt(book),
            config,
        })
    }

    fn request_body(&self, question: &str, last_calculation: Option<&CalculationResult>) -> serde_json::Value {
        let mut system = self.system_prompt.clone();
        if let Some(calc) = last_calculation {
            system.push_str(&user_context(calc));
        }
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": question },
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn answer(
        &self,
        question: &str,
        last_calculation: Option<&CalculationResult>,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(question, last_calculation))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat completion rejected");
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: CompletionResponse = resp.json().await?;
        let answer = extract_answer(body)?;
        debug!(chars = answer.len(), "chat completion received");
        Ok(answer)
    }
}

fn extract_answer(body: CompletionResponse) -> Result<String, AssistantError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(AssistantError::EmptyReply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingCalculator;
    use std::sync::Arc;

    fn assistant() -> OpenAiAssistant {
        let config = AssistantConfig {
            api_key: Some("sk-test".into()),
            ..AssistantConfig::default()
        };
        OpenAiAssistant::new(config, &TariffBook::bundled().unwrap()).unwrap()
    }

    #[test]
    fn requires_api_key() {
        let book = TariffBook::bundled().unwrap();
        let res = OpenAiAssistant::new(AssistantConfig::default(), &book);
        assert!(matches!(res, Err(AssistantError::NotConfigured)));
    }

    #[test]
    fn request_carries_model_and_context() {
        let a = assistant();
        let plain = a.request_body("Сколько стоит упаковка?", None);
        assert_eq!(plain["model"], "gpt-4o");
        assert_eq!(plain["max_tokens"], 800);
        assert_eq!(plain["messages"][1]["content"], "Сколько стоит упаковка?");
        assert!(!plain["messages"][0]["content"].as_str().unwrap().contains("КОНТЕКСТ"));

        let book = Arc::new(TariffBook::bundled().unwrap());
        let calc = PricingCalculator::new(book).calculate("ozon", 100, ["storage"]);
        let with_ctx = a.request_body("а дешевле?", Some(&calc));
        assert!(with_ctx["messages"][0]["content"].as_str().unwrap().contains("КОНТЕКСТ ПОЛЬЗОВАТЕЛЯ"));
    }

    #[test]
    fn extracts_first_choice() {
        let body: CompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Хранение 5 руб/заказ.  " } }]
        }))
        .unwrap();
        assert_eq!(extract_answer(body).unwrap(), "Хранение 5 руб/заказ.");

        let empty: CompletionResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(extract_answer(empty), Err(AssistantError::EmptyReply)));
    }
}
