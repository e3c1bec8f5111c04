//! Inline keyboard builders.

use serde_json::{json, Value};

use crate::tariffs::TariffBook;

pub const CB_MAIN_MENU: &str = "main_menu";
pub const CB_CALCULATOR: &str = "calculator";
pub const CB_APPLICATION: &str = "application";
pub const CB_COMPANY_INFO: &str = "company_info";
pub const CB_SERVICES: &str = "services";
pub const CB_ADVANTAGES: &str = "advantages";
pub const CB_AI_CHAT: &str = "ai_chat";
pub const CB_AI_ASK: &str = "ai_ask_question";
pub const CB_AI_EXAMPLES: &str = "ai_examples";
pub const CB_MARKETPLACE_PREFIX: &str = "marketplace_";
pub const CB_SERVICE_PREFIX: &str = "service_";
pub const CB_SERVICE_CALCULATE: &str = "service_calculate";
pub const CB_CALC_NEW: &str = "calc_new";
pub const CB_CALC_APPLICATION: &str = "calc_application";

fn button(text: impl Into<String>, data: impl Into<String>) -> Value {
    let (text, data): (String, String) = (text.into(), data.into());
    json!({ "text": text, "callback_data": data })
}

fn back_row() -> Value {
    json!([button("🔙 Назад в меню", CB_MAIN_MENU)])
}

pub fn main_menu_keyboard() -> Value {
    json!({
        "inline_keyboard": [
            [
                button("🧮 Калькулятор стоимости", CB_CALCULATOR),
                button("📝 Подать заявку", CB_APPLICATION),
            ],
            [
                button("🏢 О компании", CB_COMPANY_INFO),
                button("🛠 Наши услуги", CB_SERVICES),
            ],
            [
                button("⭐ Преимущества", CB_ADVANTAGES),
                button("🤖 AI-консультант", CB_AI_CHAT),
            ],
        ]
    })
}

pub fn back_keyboard() -> Value {
    json!({ "inline_keyboard": [back_row()] })
}

/// One row of two marketplaces, then the rest one per row.
pub fn marketplace_keyboard(book: &TariffBook) -> Value {
    let buttons: Vec<Value> = book
        .marketplaces()
        .iter()
        .map(|m| button(m.label(), format!("{}{}", CB_MARKETPLACE_PREFIX, m.code)))
        .collect();

    let mut rows: Vec<Value> = Vec::new();
    let mut rest = buttons.into_iter();
    let first: Vec<Value> = rest.by_ref().take(2).collect();
    if !first.is_empty() {
        rows.push(Value::Array(first));
    }
    rows.extend(rest.map(|b| json!([b])));
    rows.push(back_row());
    json!({ "inline_keyboard": rows })
}

/// Services two per row, selected ones marked. The calculate button appears
/// once at least one service is selected.
pub fn services_keyboard(book: &TariffBook, selected: &[String]) -> Value {
    let buttons: Vec<Value> = book
        .services()
        .iter()
        .map(|s| {
            let label = if selected.iter().any(|c| c == &s.code) {
                format!("✅ {}", s.label())
            } else {
                s.label()
            };
            button(label, format!("{}{}", CB_SERVICE_PREFIX, s.code))
        })
        .collect();

    let mut rows: Vec<Value> = buttons.chunks(2).map(|pair| Value::Array(pair.to_vec())).collect();
    if !selected.is_empty() {
        rows.push(json!([button("💰 Рассчитать стоимость", CB_SERVICE_CALCULATE)]));
    }
    rows.push(back_row());
    json!({ "inline_keyboard": rows })
}

pub fn calculation_result_keyboard() -> Value {
    json!({
        "inline_keyboard": [
            [
                button("🔄 Новый расчет", CB_CALC_NEW),
                button("📝 Подать заявку", CB_CALC_APPLICATION),
            ],
            [button("🔙 Главное меню", CB_MAIN_MENU)],
        ]
    })
}

pub fn ai_chat_keyboard() -> Value {
    json!({
        "inline_keyboard": [
            [
                button("❓ Задать вопрос", CB_AI_ASK),
                button("💡 Примеры вопросов", CB_AI_EXAMPLES),
            ],
            [button("🔙 Главное меню", CB_MAIN_MENU)],
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callbacks(kb: &Value) -> Vec<String> {
        kb["inline_keyboard"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|row| row.as_array().unwrap().iter())
            .map(|b| b["callback_data"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn marketplace_buttons_follow_table_order() {
        let book = TariffBook::bundled().unwrap();
        let kb = marketplace_keyboard(&book);
        assert_eq!(
            callbacks(&kb),
            ["marketplace_wildberries", "marketplace_ozon", "marketplace_yandex", "main_menu"]
        );
        assert_eq!(kb["inline_keyboard"][0].as_array().unwrap().len(), 2);
    }

    #[test]
    fn calculate_button_needs_a_selection() {
        let book = TariffBook::bundled().unwrap();
        let empty = services_keyboard(&book, &[]);
        assert!(!callbacks(&empty).contains(&CB_SERVICE_CALCULATE.to_string()));

        let picked = services_keyboard(&book, &["storage".to_string()]);
        assert!(callbacks(&picked).contains(&CB_SERVICE_CALCULATE.to_string()));
        assert_eq!(picked["inline_keyboard"][0][0]["text"], "✅ 📦 Хранение товаров");
        assert_eq!(picked["inline_keyboard"][0][1]["text"], "📮 Упаковка");
    }
}
