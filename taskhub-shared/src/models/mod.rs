/// Database models
///
/// - `user`: accounts, profile fields, avatar storage
/// - `session`: issued bearer tokens (one row per token)
/// - `task`: ownership-scoped task records
pub mod session;
pub mod task;
pub mod user;
