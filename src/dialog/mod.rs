//! Conversation flow: menus, the calculator wizard, the lead form and
//! routing of free-form questions to the consultant.
//!
//! `Dialog::handle` is pure. Side effects the bot must perform (submitting
//! a lead, asking the assistant) come back as an `Effect`.

pub mod lead;
pub mod state;
pub mod store;

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::assistant::is_question_about_services;
use crate::pricing::{CalculationResult, PricingCalculator};
use crate::tariffs::{TariffBook, TariffSource};
use crate::telegram::format::{format_calculation_result, format_marketplace_info, format_services_overview};
use crate::telegram::keyboards::{self, *};
use crate::telegram::messages;

pub use lead::Lead;
pub use state::{DialogState, Session};
pub use store::SessionStore;

/// What the user sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(String),
    Text(String),
    Callback(String),
}

impl Input {
    /// Classify a message text: leading `/` means a command.
    pub fn from_message(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('/') {
            // "/start@SomeBot payload" → "/start"
            let cmd = trimmed
                .split_whitespace()
                .next()
                .unwrap_or(trimmed)
                .split('@')
                .next()
                .unwrap_or(trimmed)
                .to_lowercase();
            Input::Command(cmd)
        } else {
            Input::Text(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Value>,
}

impl Reply {
    fn new(text: impl Into<String>, keyboard: Value) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }
}

/// Work the transport has to do after sending the reply.
#[derive(Debug, Clone)]
pub enum Effect {
    Calculated(CalculationResult),
    SubmitLead(Lead),
    AskAssistant {
        question: String,
        last_calculation: Option<CalculationResult>,
    },
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub reply: Reply,
    pub effect: Option<Effect>,
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Self { reply, effect: None }
    }
}

/// Conversation handler shared by all chats.
pub struct Dialog {
    book: Arc<TariffBook>,
    calculator: PricingCalculator<TariffBook>,
}

impl Dialog {
    pub fn new(book: Arc<TariffBook>) -> Self {
        Self {
            calculator: PricingCalculator::new(book.clone()),
            book,
        }
    }

    pub fn handle(&self, chat_id: i64, session: &mut Session, input: Input) -> Outcome {
        let from = session.state.name();
        let outcome = match input {
            Input::Command(cmd) => self.on_command(session, &cmd),
            Input::Callback(data) => self.on_callback(session, &data),
            Input::Text(text) => self.on_text(chat_id, session, text),
        };
        debug!(chat_id, from, to = session.state.name(), "dialog transition");
        outcome
    }

    fn on_command(&self, session: &mut Session, cmd: &str) -> Outcome {
        match cmd {
            "/start" => self.main_menu(session).into(),
            "/help" => Reply::plain(messages::HELP).into(),
            _ => Reply::new(messages::TAP_A_BUTTON, main_menu_keyboard()).into(),
        }
    }

    fn on_callback(&self, session: &mut Session, data: &str) -> Outcome {
        match data {
            CB_MAIN_MENU => return self.main_menu(session).into(),
            CB_COMPANY_INFO => {
                session.state = DialogState::Idle;
                return Reply::new(messages::COMPANY_INFO, back_keyboard()).into();
            }
            CB_SERVICES => {
                session.state = DialogState::Idle;
                return Reply::new(format_services_overview(&self.book), back_keyboard()).into();
            }
            CB_ADVANTAGES => {
                session.state = DialogState::Idle;
                return Reply::new(messages::ADVANTAGES, back_keyboard()).into();
            }
            CB_CALCULATOR => return self.start_calculator(session).into(),
            CB_APPLICATION => return self.start_lead(session).into(),
            CB_AI_CHAT => {
                session.state = DialogState::Idle;
                return Reply::new(messages::AI_INTRO, ai_chat_keyboard()).into();
            }
            CB_AI_EXAMPLES => return Reply::new(messages::AI_EXAMPLES, ai_chat_keyboard()).into(),
            CB_AI_ASK => {
                session.state = DialogState::AwaitingQuestion;
                return Reply::new(messages::AI_ASK, back_keyboard()).into();
            }
            _ => {}
        }

        let state = std::mem::take(&mut session.state);
        match state {
            DialogState::ChoosingMarketplace if data.starts_with(CB_MARKETPLACE_PREFIX) => {
                let code = &data[CB_MARKETPLACE_PREFIX.len()..];
                let text = match self.book.marketplace_tariff(code) {
                    Some(mp) => format!(
                        "{}\n{}",
                        format_marketplace_info(mp),
                        messages::orders_count_prompt(&mp.label())
                    ),
                    None => messages::orders_count_prompt(code),
                };
                session.state = DialogState::EnteringOrders {
                    marketplace: code.to_string(),
                };
                Reply::new(text, back_keyboard()).into()
            }
            DialogState::ChoosingServices {
                marketplace,
                orders_count,
                selected,
            } if data == CB_SERVICE_CALCULATE && !selected.is_empty() => {
                let result = self.calculator.calculate(&marketplace, orders_count, &selected);
                let text = format_calculation_result(&result, &self.book);
                session.last_calculation = Some(result.clone());
                session.state = DialogState::ViewingResult;
                Outcome {
                    reply: Reply::new(text, calculation_result_keyboard()),
                    effect: Some(Effect::Calculated(result)),
                }
            }
            DialogState::ChoosingServices {
                marketplace,
                orders_count,
                mut selected,
            } if data.starts_with(CB_SERVICE_PREFIX) => {
                let code = &data[CB_SERVICE_PREFIX.len()..];
                if code != "calculate" {
                    toggle(&mut selected, code);
                }
                let keyboard = keyboards::services_keyboard(&self.book, &selected);
                session.state = DialogState::ChoosingServices {
                    marketplace,
                    orders_count,
                    selected,
                };
                Reply::new(messages::SERVICES_CHOICE, keyboard).into()
            }
            DialogState::ViewingResult if data == CB_CALC_NEW => self.start_calculator(session).into(),
            DialogState::ViewingResult if data == CB_CALC_APPLICATION => self.start_lead(session).into(),
            _ => {
                session.state = DialogState::Idle;
                Reply::new(messages::SESSION_EXPIRED, main_menu_keyboard()).into()
            }
        }
    }

    fn on_text(&self, chat_id: i64, session: &mut Session, text: String) -> Outcome {
        let state = std::mem::take(&mut session.state);
        match state {
            DialogState::EnteringOrders { marketplace } => match parse_orders_count(&text) {
                Some(orders_count) => {
                    let keyboard = keyboards::services_keyboard(&self.book, &[]);
                    session.state = DialogState::ChoosingServices {
                        marketplace,
                        orders_count,
                        selected: Vec::new(),
                    };
                    Reply::new(messages::SERVICES_CHOICE, keyboard).into()
                }
                None => {
                    session.state = DialogState::EnteringOrders { marketplace };
                    Reply::plain(messages::INVALID_ORDERS_COUNT).into()
                }
            },
            DialogState::LeadName => {
                if text.is_empty() {
                    session.state = DialogState::LeadName;
                    return Reply::plain(messages::APPLICATION_START).into();
                }
                session.state = DialogState::LeadContact { name: text };
                Reply::plain(messages::APPLICATION_CONTACT).into()
            }
            DialogState::LeadContact { name } => {
                if text.is_empty() {
                    session.state = DialogState::LeadContact { name };
                    return Reply::plain(messages::APPLICATION_CONTACT).into();
                }
                session.state = DialogState::LeadDescription { name, contact: text };
                Reply::plain(messages::APPLICATION_DESCRIPTION).into()
            }
            DialogState::LeadDescription { name, contact } => {
                if text.is_empty() {
                    session.state = DialogState::LeadDescription { name, contact };
                    return Reply::plain(messages::APPLICATION_DESCRIPTION).into();
                }
                let lead = Lead {
                    chat_id,
                    username: session.username.clone(),
                    name,
                    contact,
                    description: text,
                    last_calculation: session.last_calculation.clone(),
                    submitted_at: Utc::now(),
                };
                Outcome {
                    reply: Reply::new(messages::APPLICATION_COMPLETE, main_menu_button()),
                    effect: Some(Effect::SubmitLead(lead)),
                }
            }
            DialogState::AwaitingQuestion => {
                session.state = DialogState::AwaitingQuestion;
                self.ask(session, text)
            }
            other => {
                session.state = other;
                if is_question_about_services(&text) {
                    self.ask(session, text)
                } else {
                    Reply::new(messages::TAP_A_BUTTON, main_menu_keyboard()).into()
                }
            }
        }
    }

    fn main_menu(&self, session: &mut Session) -> Reply {
        session.state = DialogState::Idle;
        Reply::new(messages::welcome(&session.first_name), main_menu_keyboard())
    }

    fn start_calculator(&self, session: &mut Session) -> Reply {
        session.state = DialogState::ChoosingMarketplace;
        Reply::new(messages::CALCULATOR_START, keyboards::marketplace_keyboard(&self.book))
    }

    fn start_lead(&self, session: &mut Session) -> Reply {
        session.state = DialogState::LeadName;
        Reply::plain(messages::APPLICATION_START)
    }

    fn ask(&self, session: &Session, question: String) -> Outcome {
        Outcome {
            reply: Reply::plain(messages::AI_THINKING),
            effect: Some(Effect::AskAssistant {
                question,
                last_calculation: session.last_calculation.clone(),
            }),
        }
    }
}

fn main_menu_button() -> Value {
    serde_json::json!({
        "inline_keyboard": [[{ "text": "🔙 Главное меню", "callback_data": CB_MAIN_MENU }]]
    })
}

fn toggle(selected: &mut Vec<String>, code: &str) {
    if let Some(pos) = selected.iter().position(|c| c == code) {
        selected.remove(pos);
    } else {
        selected.push(code.to_string());
    }
}

/// Positive whole number, spaces allowed as digit grouping ("2 000").
pub fn parse_orders_count(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse::<i64>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog() -> Dialog {
        Dialog::new(Arc::new(TariffBook::bundled().unwrap()))
    }

    fn cb(d: &Dialog, s: &mut Session, data: &str) -> Outcome {
        d.handle(42, s, Input::Callback(data.into()))
    }

    fn text(d: &Dialog, s: &mut Session, t: &str) -> Outcome {
        d.handle(42, s, Input::from_message(t))
    }

    fn run_calculation(d: &Dialog, s: &mut Session) -> CalculationResult {
        cb(d, s, CB_CALCULATOR);
        cb(d, s, "marketplace_wildberries");
        text(d, s, "2000");
        cb(d, s, "service_storage");
        cb(d, s, "service_packaging");
        cb(d, s, CB_SERVICE_CALCULATE);
        s.last_calculation.clone().unwrap()
    }

    #[test]
    fn classifies_commands() {
        assert_eq!(Input::from_message("/start"), Input::Command("/start".into()));
        assert_eq!(Input::from_message("/START@FulfillBot"), Input::Command("/start".into()));
        assert_eq!(Input::from_message("  2000 "), Input::Text("2000".into()));
    }

    #[test]
    fn start_shows_welcome_and_resets() {
        let d = dialog();
        let mut s = Session {
            first_name: "Олег".into(),
            state: DialogState::LeadName,
            ..Session::default()
        };
        let out = text(&d, &mut s, "/start");
        assert!(out.reply.text.contains("Олег"));
        assert!(out.reply.keyboard.is_some());
        assert_eq!(s.state, DialogState::Idle);
    }

    #[test]
    fn calculator_wizard_produces_result() {
        let d = dialog();
        let mut s = Session::default();

        let out = cb(&d, &mut s, CB_CALCULATOR);
        assert_eq!(s.state, DialogState::ChoosingMarketplace);
        assert_eq!(out.reply.text, messages::CALCULATOR_START);

        let out = cb(&d, &mut s, "marketplace_wildberries");
        assert!(out.reply.text.contains("Wildberries"));
        assert_eq!(
            s.state,
            DialogState::EnteringOrders { marketplace: "wildberries".into() }
        );

        text(&d, &mut s, "2000");
        cb(&d, &mut s, "service_storage");
        cb(&d, &mut s, "service_packaging");
        let out = cb(&d, &mut s, CB_SERVICE_CALCULATE);

        assert_eq!(s.state, DialogState::ViewingResult);
        assert!(out.reply.text.contains("ИТОГО: 382,000 руб/мес"));
        let result = s.last_calculation.as_ref().unwrap();
        assert_eq!(result.services.len(), 2);
        assert!(matches!(out.effect, Some(Effect::Calculated(ref r)) if r == result));
    }

    #[test]
    fn invalid_order_counts_are_rejected() {
        let d = dialog();
        let mut s = Session::default();
        cb(&d, &mut s, CB_CALCULATOR);
        cb(&d, &mut s, "marketplace_ozon");

        for bad in ["abc", "0", "-5", "12.5"] {
            let out = text(&d, &mut s, bad);
            assert_eq!(out.reply.text, messages::INVALID_ORDERS_COUNT, "input {bad:?}");
            assert_eq!(s.state, DialogState::EnteringOrders { marketplace: "ozon".into() });
        }

        text(&d, &mut s, "1 500");
        assert!(matches!(
            s.state,
            DialogState::ChoosingServices { orders_count: 1500, .. }
        ));
    }

    #[test]
    fn service_buttons_toggle() {
        let d = dialog();
        let mut s = Session::default();
        cb(&d, &mut s, CB_CALCULATOR);
        cb(&d, &mut s, "marketplace_ozon");
        text(&d, &mut s, "100");

        cb(&d, &mut s, "service_storage");
        cb(&d, &mut s, "service_photo");
        cb(&d, &mut s, "service_storage");
        match &s.state {
            DialogState::ChoosingServices { selected, .. } => assert_eq!(selected, &["photo".to_string()]),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn calculate_without_selection_keeps_choosing() {
        let d = dialog();
        let mut s = Session::default();
        cb(&d, &mut s, CB_CALCULATOR);
        cb(&d, &mut s, "marketplace_ozon");
        text(&d, &mut s, "100");

        let out = cb(&d, &mut s, CB_SERVICE_CALCULATE);
        assert_eq!(out.reply.text, messages::SERVICES_CHOICE);
        assert!(s.last_calculation.is_none());
        assert!(matches!(s.state, DialogState::ChoosingServices { .. }));
    }

    #[test]
    fn result_buttons_restart_or_apply() {
        let d = dialog();
        let mut s = Session::default();
        run_calculation(&d, &mut s);
        cb(&d, &mut s, CB_CALC_NEW);
        assert_eq!(s.state, DialogState::ChoosingMarketplace);
        assert!(s.last_calculation.is_some());

        let mut s = Session::default();
        run_calculation(&d, &mut s);
        let out = cb(&d, &mut s, CB_CALC_APPLICATION);
        assert_eq!(out.reply.text, messages::APPLICATION_START);
        assert_eq!(s.state, DialogState::LeadName);
    }

    #[test]
    fn lead_form_collects_three_fields() {
        let d = dialog();
        let mut s = Session {
            username: Some("seller".into()),
            ..Session::default()
        };
        let calc = run_calculation(&d, &mut s);

        cb(&d, &mut s, CB_CALC_APPLICATION);
        assert_eq!(text(&d, &mut s, "Ирина").reply.text, messages::APPLICATION_CONTACT);
        assert_eq!(text(&d, &mut s, "+7 900 000-00-00").reply.text, messages::APPLICATION_DESCRIPTION);
        let out = text(&d, &mut s, "Одежда, 2000 заказов");

        assert_eq!(out.reply.text, messages::APPLICATION_COMPLETE);
        assert_eq!(s.state, DialogState::Idle);
        match out.effect {
            Some(Effect::SubmitLead(lead)) => {
                assert_eq!(lead.chat_id, 42);
                assert_eq!(lead.username.as_deref(), Some("seller"));
                assert_eq!(lead.name, "Ирина");
                assert_eq!(lead.contact, "+7 900 000-00-00");
                assert_eq!(lead.description, "Одежда, 2000 заказов");
                assert_eq!(lead.last_calculation, Some(calc));
            }
            other => panic!("expected lead, got {other:?}"),
        }
    }

    #[test]
    fn stale_buttons_reset_to_menu() {
        let d = dialog();
        let mut s = Session::default();
        let out = cb(&d, &mut s, "marketplace_ozon");
        assert_eq!(out.reply.text, messages::SESSION_EXPIRED);
        assert_eq!(s.state, DialogState::Idle);

        let out = cb(&d, &mut s, CB_CALC_NEW);
        assert_eq!(out.reply.text, messages::SESSION_EXPIRED);
    }

    #[test]
    fn questions_go_to_assistant() {
        let d = dialog();
        let mut s = Session::default();

        let out = text(&d, &mut s, "Сколько стоит хранение?");
        assert!(matches!(out.effect, Some(Effect::AskAssistant { .. })));

        let out = text(&d, &mut s, "привет");
        assert!(out.effect.is_none());
        assert_eq!(out.reply.text, messages::TAP_A_BUTTON);

        cb(&d, &mut s, CB_AI_ASK);
        let out = text(&d, &mut s, "привет");
        match out.effect {
            Some(Effect::AskAssistant { question, last_calculation }) => {
                assert_eq!(question, "привет");
                assert!(last_calculation.is_none());
            }
            other => panic!("expected question, got {other:?}"),
        }
        assert_eq!(s.state, DialogState::AwaitingQuestion);
    }

    #[test]
    fn static_menu_callbacks() {
        let d = dialog();
        let overview = format_services_overview(&d.book);
        let cases: [(&str, &str, Value, DialogState); 5] = [
            (CB_COMPANY_INFO, messages::COMPANY_INFO, back_keyboard(), DialogState::Idle),
            (CB_SERVICES, overview.as_str(), back_keyboard(), DialogState::Idle),
            (CB_ADVANTAGES, messages::ADVANTAGES, back_keyboard(), DialogState::Idle),
            (CB_AI_CHAT, messages::AI_INTRO, ai_chat_keyboard(), DialogState::Idle),
            (CB_AI_ASK, messages::AI_ASK, back_keyboard(), DialogState::AwaitingQuestion),
        ];

        for (data, reply, keyboard, state) in cases {
            let mut s = Session {
                state: DialogState::LeadContact { name: "Ирина".into() },
                ..Session::default()
            };
            let out = cb(&d, &mut s, data);
            assert_eq!(out.reply.text, reply, "callback {data}");
            assert_eq!(out.reply.keyboard, Some(keyboard), "callback {data}");
            assert_eq!(s.state, state, "callback {data}");
            assert!(out.effect.is_none());
        }
    }

    #[test]
    fn help_command_shows_help() {
        let d = dialog();
        let mut s = Session::default();
        let out = text(&d, &mut s, "/help");
        assert_eq!(out.reply.text, messages::HELP);
        assert!(out.reply.keyboard.is_none());
        assert_eq!(s.state, DialogState::Idle);
    }

    #[test]
    fn ai_examples_keep_state() {
        let d = dialog();
        let mut s = Session {
            state: DialogState::AwaitingQuestion,
            ..Session::default()
        };
        let out = cb(&d, &mut s, CB_AI_EXAMPLES);
        assert_eq!(out.reply.text, messages::AI_EXAMPLES);
        assert_eq!(out.reply.keyboard, Some(ai_chat_keyboard()));
        assert_eq!(s.state, DialogState::AwaitingQuestion);
    }

    #[test]
    fn main_menu_abandons_wizard() {
        let d = dialog();
        let mut s = Session {
            first_name: "Олег".into(),
            ..Session::default()
        };
        cb(&d, &mut s, CB_CALCULATOR);
        cb(&d, &mut s, "marketplace_ozon");
        text(&d, &mut s, "100");
        cb(&d, &mut s, "service_storage");
        assert!(matches!(s.state, DialogState::ChoosingServices { .. }));

        let out = cb(&d, &mut s, CB_MAIN_MENU);
        assert_eq!(s.state, DialogState::Idle);
        assert_eq!(out.reply.text, messages::welcome("Олег"));
        assert_eq!(out.reply.keyboard, Some(main_menu_keyboard()));
        assert!(s.last_calculation.is_none());
    }

    #[test]
    fn parses_order_counts() {
        assert_eq!(parse_orders_count("2000"), Some(2000));
        assert_eq!(parse_orders_count(" 10 000 "), Some(10_000));
        assert_eq!(parse_orders_count("0"), None);
        assert_eq!(parse_orders_count(""), None);
        assert_eq!(parse_orders_count("1e3"), None);
    }
}
