//! # Marquee Models
//!
//! Domain models, request DTOs and response envelopes for the Marquee API.
//!
//! - [`movies`]: Movie entity, runtime type, create/replace/patch DTOs
//! - [`users`]: User entity and account DTOs
//! - [`tokens`]: Token request DTOs
//! - [`envelopes`]: Named top-level wrappers for every JSON response
//!
//! Request DTOs reject unknown keys. Missing keys fall back to empty values so
//! that validation, not deserialization, reports them as "must be provided".

pub mod envelopes;
pub mod movies;
pub mod tokens;
pub mod users;

pub use envelopes::{
    AuthenticationTokenEnvelope, HealthEnvelope, MessageEnvelope, MovieEnvelope, MoviesEnvelope,
    SystemInfo, UserEnvelope,
};
pub use movies::{MOVIE_SORT_SAFELIST, Movie, MovieInputDto, PatchMovieDto, Runtime};
pub use tokens::{CreateAuthenticationTokenDto, TokenRequestDto};
pub use users::{ActivateUserDto, RegisterUserDto, ResetPasswordDto, User};
