//! Lead captured by the three-step application form.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pricing::CalculationResult;

#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub chat_id: i64,
    pub username: Option<String>,
    pub name: String,
    pub contact: String,
    pub description: String,
    pub last_calculation: Option<CalculationResult>,
    pub submitted_at: DateTime<Utc>,
}
