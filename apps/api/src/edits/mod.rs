// Suggestion lifecycle and edit application: the session-owned data model,
// the change tracker that sequences per-edit application, and the audit
// record exported alongside the artifact.

pub mod audit;
pub mod handlers;
pub mod models;
pub mod session;
pub mod suggest;
pub mod tracker;
