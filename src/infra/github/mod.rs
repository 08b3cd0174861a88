// GitHub infra layer.
// - `github_client.rs` talks to the GitHub HTTP API and fetches the
//   per-repository moderation config.

#[path = "github_client.rs"]
pub mod github_client;
