pub mod api;
pub mod bot;
pub mod format;
pub mod keyboards;
pub mod messages;
