pub mod action;
pub mod check;
pub mod dispatch;
pub mod flow;
pub mod message;
pub mod orchestrator;
pub mod report;
pub mod rules;
pub mod session;
pub mod state;

pub use {action::Action, message::Message, orchestrator::Orchestrator, report::Report};
