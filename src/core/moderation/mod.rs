// Core moderation module - the mark-and-sweep engine.
// Following the same pattern as the policy module.

pub mod action_budget;
pub mod moderation_models;
pub mod moderation_service;
pub mod platform;
pub mod search_query;

pub use action_budget::*;
pub use moderation_models::*;
pub use moderation_service::*;
pub use platform::*;
