/// API route handlers
///
/// - `users`: signup, login, logout, profile, avatar
/// - `tasks`: ownership-scoped task CRUD with query shaping
/// - `health`: liveness check
pub mod health;
pub mod tasks;
pub mod users;
