//! Telegram bot — polls updates, drives the dialog, delivers replies and
//! forwards business events to the admin chat.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::api::{TelegramApi, Update};
use super::format::group_thousands;
use super::keyboards::ai_chat_keyboard;
use super::messages::{self, escape_html};
use crate::assistant::Assistant;
use crate::config::TelegramConfig;
use crate::dialog::{Dialog, Effect, Input, Outcome, SessionStore};
use crate::events::bus::{BotEvent, EventBus};

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);
/// At most one assistant-failure alert per window; an outage would
/// otherwise page the admin once per question.
const ASSISTANT_ALERT_COOLDOWN: Duration = Duration::from_secs(600);

/// Lets the first alert through, then mutes until the cooldown has passed.
struct AlertThrottle {
    cooldown: Duration,
    last_sent: Option<Instant>,
}

impl AlertThrottle {
    fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: None,
        }
    }

    fn allow(&mut self, now: Instant) -> bool {
        match self.last_sent {
            Some(prev) if now.saturating_duration_since(prev) < self.cooldown => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }
}

/// Where a reply goes: a fresh message, or an edit of the message whose
/// button was pressed.
enum Target {
    New,
    Edit { message_id: i64, callback_id: String },
}

/// Telegram front-end for the dialog.
pub struct TelegramBot {
    api: TelegramApi,
    config: TelegramConfig,
    dialog: Arc<Dialog>,
    sessions: Arc<SessionStore>,
    assistant: Arc<dyn Assistant>,
    event_bus: Arc<EventBus>,
    events: broadcast::Receiver<BotEvent>,
    assistant_alerts: AlertThrottle,
    next_offset: i64,
}

impl TelegramBot {
    /// `None` when no bot token is configured.
    pub fn new(
        config: TelegramConfig,
        dialog: Arc<Dialog>,
        assistant: Arc<dyn Assistant>,
        event_bus: Arc<EventBus>,
    ) -> Option<Self> {
        let token = config.bot_token.clone()?;
        Some(Self {
            api: TelegramApi::new(&config.api_base_url, &token),
            events: event_bus.subscribe(),
            config,
            dialog,
            sessions: Arc::new(SessionStore::new()),
            assistant,
            event_bus,
            assistant_alerts: AlertThrottle::new(ASSISTANT_ALERT_COOLDOWN),
            next_offset: 0,
        })
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(
            admin_alerts = self.config.admin_chat_id.is_some(),
            "telegram bot started"
        );

        let period = Duration::from_millis(self.config.poll_interval_ms.max(100));
        let mut poll_interval = tokio::time::interval(period);
        let session_ttl = Duration::from_secs(self.config.session_ttl_secs.max(60));
        let mut sweep_interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    match self.api.get_updates(self.next_offset).await {
                        Ok(batch) => {
                            if let Some(last) = batch.last_update_id {
                                self.next_offset = last + 1;
                            }
                            for update in batch.updates {
                                self.handle_update(update).await;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to poll telegram updates");
                        }
                    }
                }
                _ = sweep_interval.tick() => {
                    let evicted = self.sessions.evict_idle(session_ttl);
                    if evicted > 0 {
                        debug!(evicted, active = self.sessions.len(), "evicted idle sessions");
                    }
                }
                event = self.events.recv() => {
                    match event {
                        Ok(ev) => self.forward_event(&ev).await,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "telegram event receiver lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("event bus closed, telegram bot shutting down");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_update(&self, update: Update) {
        debug!(update_id = update.update_id(), sessions = self.sessions.len(), "telegram update");
        let (chat_id, first_name, username, input, target) = match update {
            Update::Message { chat_id, text, first_name, username, .. } => {
                (chat_id, first_name, username, Input::from_message(&text), Target::New)
            }
            Update::Callback { chat_id, data, message_id, callback_id, first_name, username, .. } => (
                chat_id,
                first_name,
                username,
                Input::Callback(data),
                Target::Edit { message_id, callback_id },
            ),
        };

        let outcome = self.sessions.with_session(chat_id, |session| {
            if !first_name.is_empty() {
                session.first_name = first_name;
            }
            if username.is_some() {
                session.username = username;
            }
            self.dialog.handle(chat_id, session, input)
        });

        self.deliver(chat_id, &target, &outcome).await;
        if let Some(effect) = outcome.effect {
            self.apply_effect(chat_id, effect);
        }
    }

    async fn deliver(&self, chat_id: i64, target: &Target, outcome: &Outcome) {
        let chat = chat_id.to_string();
        let reply = &outcome.reply;
        let sent = match target {
            Target::New => self.api.send_message(&chat, &reply.text, reply.keyboard.as_ref()).await,
            Target::Edit { message_id, callback_id } => {
                if let Err(e) = self.api.answer_callback(callback_id).await {
                    warn!(error = %e, "failed to answer callback");
                }
                self.api
                    .edit_message(&chat, *message_id, &reply.text, reply.keyboard.as_ref())
                    .await
            }
        };
        if let Err(e) = sent {
            warn!(chat_id, error = %e, "failed to deliver reply");
        }
    }

    fn apply_effect(&self, chat_id: i64, effect: Effect) {
        match effect {
            Effect::Calculated(result) => {
                info!(
                    chat_id,
                    marketplace = %result.marketplace,
                    orders = result.orders_count,
                    total = result.total_cost,
                    "calculation completed"
                );
                self.event_bus.publish(BotEvent::CalculationCompleted {
                    source: "telegram".into(),
                    marketplace: result.marketplace,
                    orders_count: result.orders_count,
                    total_cost: result.total_cost,
                });
            }
            Effect::SubmitLead(lead) => {
                info!(chat_id, name = %lead.name, "lead submitted");
                self.event_bus.publish(BotEvent::LeadSubmitted(lead));
            }
            Effect::AskAssistant { question, last_calculation } => {
                let api = self.api.clone();
                let assistant = self.assistant.clone();
                let event_bus = self.event_bus.clone();
                tokio::spawn(async move {
                    let text = match assistant.answer(&question, last_calculation.as_ref()).await {
                        Ok(answer) => escape_html(&answer),
                        Err(e) => {
                            error!(chat_id, error = %e, "assistant failed");
                            event_bus.publish(BotEvent::AssistantFailed {
                                chat_id,
                                error: e.to_string(),
                            });
                            messages::assistant_unavailable()
                        }
                    };
                    let kb = ai_chat_keyboard();
                    if let Err(e) = api.send_message(&chat_id.to_string(), &text, Some(&kb)).await {
                        warn!(chat_id, error = %e, "failed to send assistant answer");
                    }
                });
            }
        }
    }

    async fn forward_event(&mut self, event: &BotEvent) {
        let Some(admin) = &self.config.admin_chat_id else {
            return;
        };
        if matches!(event, BotEvent::AssistantFailed { .. }) && !self.assistant_alerts.allow(Instant::now()) {
            debug!("assistant failure alert muted");
            return;
        }
        if let Err(e) = self.api.send_message(admin, &format_event(event), None).await {
            warn!(error = %e, "failed to send admin alert");
        }
    }
}

/// Format a BotEvent into an admin alert.
pub fn format_event(event: &BotEvent) -> String {
    match event {
        BotEvent::LeadSubmitted(lead) => {
            let mut msg = format!(
                "📝 <b>Новая заявка</b>\n\
                Имя: {}\n\
                Контакт: {}\n\
                Задача: {}\n\
                Telegram: {}",
                escape_html(&lead.name),
                escape_html(&lead.contact),
                escape_html(&lead.description),
                lead.username
                    .as_ref()
                    .map(|u| format!("@{}", u))
                    .unwrap_or_else(|| format!("chat {}", lead.chat_id)),
            );
            if let Some(calc) = &lead.last_calculation {
                msg.push_str(&format!(
                    "\nРасчет: {}, {} заказов/мес, {} руб/мес",
                    escape_html(&calc.marketplace),
                    group_thousands(calc.orders_count as f64),
                    group_thousands(calc.total_cost),
                ));
            }
            msg
        }
        BotEvent::CalculationCompleted { source, marketplace, orders_count, total_cost } => format!(
            "🧮 Расчет ({}): {}, {} заказов/мес → {} руб/мес",
            escape_html(source),
            escape_html(marketplace),
            group_thousands(*orders_count as f64),
            group_thousands(*total_cost),
        ),
        BotEvent::AssistantFailed { chat_id, error } => format!(
            "⚠️ AI-консультант не ответил (chat {}): {}",
            chat_id,
            escape_html(error),
        ),
    }
}
