// Policy module - per-repository moderation configuration.
// `policy_models.rs` holds the resolved shape, `policy_schema.rs` the
// best-effort validation pass over raw YAML.

pub mod policy_models;
pub mod policy_schema;

pub use policy_models::*;
pub use policy_schema::*;
