// Moderation engine for issue and pull-request text.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (the GitHub REST adapter)
//
// The binary in `main.rs` wires the two together and runs the periodic
// mark-and-sweep schedule. Event-triggered entry points (`evaluate_and_act`)
// are exposed here for a webhook layer to call.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a pile of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;
