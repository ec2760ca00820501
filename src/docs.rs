use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use marquee_auth::Token;
use marquee_core::Metadata;
use marquee_models::{
    ActivateUserDto, AuthenticationTokenEnvelope, CreateAuthenticationTokenDto, HealthEnvelope,
    MessageEnvelope, Movie, MovieEnvelope, MovieInputDto, MoviesEnvelope, PatchMovieDto,
    RegisterUserDto, ResetPasswordDto, SystemInfo, TokenRequestDto, User, UserEnvelope,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::healthcheck::controller::healthcheck,
        crate::modules::movies::controller::list_movies,
        crate::modules::movies::controller::create_movie,
        crate::modules::movies::controller::show_movie,
        crate::modules::movies::controller::update_movie,
        crate::modules::movies::controller::patch_movie,
        crate::modules::movies::controller::delete_movie,
        crate::modules::users::controller::register_user,
        crate::modules::users::controller::activate_user,
        crate::modules::users::controller::update_user_password,
        crate::modules::tokens::controller::create_authentication_token,
        crate::modules::tokens::controller::create_activation_token,
        crate::modules::tokens::controller::create_password_reset_token,
    ),
    components(
        schemas(
            Movie,
            MovieInputDto,
            PatchMovieDto,
            MovieEnvelope,
            MoviesEnvelope,
            Metadata,
            User,
            RegisterUserDto,
            ActivateUserDto,
            ResetPasswordDto,
            UserEnvelope,
            Token,
            CreateAuthenticationTokenDto,
            TokenRequestDto,
            AuthenticationTokenEnvelope,
            MessageEnvelope,
            HealthEnvelope,
            SystemInfo,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service availability"),
        (name = "Movies", description = "Movie catalog endpoints"),
        (name = "Users", description = "Account registration and activation"),
        (name = "Tokens", description = "Authentication, activation and password-reset tokens")
    ),
    info(
        title = "Marquee API",
        version = "0.1.0",
        description = "A movie catalog REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            )
        }
    }
}
