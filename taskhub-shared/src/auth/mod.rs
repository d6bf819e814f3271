/// Authentication primitives
///
/// - `password`: Argon2id hashing and the signup password policy
/// - `jwt`: HS256 identity tokens (no expiry claim)
/// - `session`: the credential & token service backed by the sessions table
pub mod jwt;
pub mod password;
pub mod session;
