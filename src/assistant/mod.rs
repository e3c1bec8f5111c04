//! AI consultant — answers free-form questions about tariffs and services.

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

use crate::pricing::CalculationResult;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant is not configured")]
    NotConfigured,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty completion")]
    EmptyReply,
}

/// A consultant that can answer one question at a time.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        last_calculation: Option<&CalculationResult>,
    ) -> Result<String, AssistantError>;
}

/// Stand-in used when no API key is configured.
pub struct DisabledAssistant;

#[async_trait]
impl Assistant for DisabledAssistant {
    async fn answer(&self, _: &str, _: Option<&CalculationResult>) -> Result<String, AssistantError> {
        Err(AssistantError::NotConfigured)
    }
}

const SERVICE_KEYWORDS: &[&str] = &[
    "фулфилмент", "склад", "хранение", "упаковка", "отправка", "доставка",
    "возврат", "маркировка", "wildberries", "ozon", "яндекс", "маркет",
    "стоимость", "цена", "тариф", "сколько", "услуг", "фото", "качество",
    "аналитика", "комиссия", "расчет", "калькулятор",
];

/// Whether free text looks like a question the consultant should take.
pub fn is_question_about_services(message: &str) -> bool {
    let lower = message.to_lowercase();
    SERVICE_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_service_questions() {
        assert!(is_question_about_services("Сколько стоит ХРАНЕНИЕ?"));
        assert!(is_question_about_services("работаете с Ozon?"));
        assert!(is_question_about_services("Какие услуги есть"));
        assert!(!is_question_about_services("привет"));
        assert!(!is_question_about_services(""));
    }

    #[tokio::test]
    async fn disabled_assistant_refuses() {
        let err = DisabledAssistant.answer("цена?", None).await.unwrap_err();
        assert!(matches!(err, AssistantError::NotConfigured));
    }
}
