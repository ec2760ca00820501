pub mod healthcheck;
pub mod movies;
pub mod permissions;
pub mod tokens;
pub mod users;
