// handlers/protected/mod.rs - Protected handlers (access token required)
//
// Every route here sits behind jwt_auth_middleware, which puts an AuthUser
// into the request extensions.
pub mod auth;
pub mod categories;
pub mod stores;
