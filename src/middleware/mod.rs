//! Middleware for request processing.
//!
//! - [`auth`]: Resolves the bearer token into a [`RequestUser`](auth::RequestUser)
//! - [`authorization`]: Authenticated, activated and permission gates
//! - [`rate_limit`]: Per-client token bucket limiting
//!
//! # Request Flow
//!
//! 1. `rate_limit` takes a token from the client's bucket or answers 429
//! 2. `authenticate` stores `Anonymous` or `Authenticated(user)` in the request extensions
//! 3. Route gates read it through the `CurrentUser` extractor
//! 4. The handler runs only if every gate passed

pub mod auth;
pub mod authorization;
pub mod rate_limit;
