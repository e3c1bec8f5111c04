//! Per-chat conversation state.

use crate::pricing::CalculationResult;

/// Where a chat is in the menus, the calculator wizard or the lead form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogState {
    #[default]
    Idle,
    ChoosingMarketplace,
    EnteringOrders {
        marketplace: String,
    },
    ChoosingServices {
        marketplace: String,
        orders_count: i64,
        selected: Vec<String>,
    },
    ViewingResult,
    LeadName,
    LeadContact {
        name: String,
    },
    LeadDescription {
        name: String,
        contact: String,
    },
    AwaitingQuestion,
}

impl DialogState {
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::Idle => "idle",
            DialogState::ChoosingMarketplace => "choosing_marketplace",
            DialogState::EnteringOrders { .. } => "entering_orders",
            DialogState::ChoosingServices { .. } => "choosing_services",
            DialogState::ViewingResult => "viewing_result",
            DialogState::LeadName => "lead_name",
            DialogState::LeadContact { .. } => "lead_contact",
            DialogState::LeadDescription { .. } => "lead_description",
            DialogState::AwaitingQuestion => "awaiting_question",
        }
    }
}

/// Everything the bot remembers about one chat.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: DialogState,
    pub first_name: String,
    pub username: Option<String>,
    /// Kept across wizard restarts; attached to leads and assistant questions.
    pub last_calculation: Option<CalculationResult>,
}
