mod actions;
mod components;
mod handlers;
mod screens;

pub use components::{DashboardTab, DashboardUI, FocusedWidget, StatusMessage};
pub use screens::draw;
