use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::authorization::{
    require_authenticated_user, require_movies_read, require_movies_write,
};
use crate::modules::movies::controller::{
    create_movie, delete_movie, list_movies, patch_movie, show_movie, update_movie,
};
use crate::state::AppState;

/// Movie routes. Gates differ per method on the same path, so each method
/// carries its own route layer.
pub fn init_movies_router(state: &AppState) -> Router<AppState> {
    let read = || middleware::from_fn_with_state(state.clone(), require_movies_read);
    let write = || middleware::from_fn_with_state(state.clone(), require_movies_write);

    Router::new()
        .route(
            "/v1/movies",
            get(list_movies)
                .route_layer(middleware::from_fn(require_authenticated_user))
                .merge(post(create_movie).route_layer(write())),
        )
        .route(
            "/v1/movies/{id}",
            get(show_movie).route_layer(read()).merge(
                put(update_movie)
                    .patch(patch_movie)
                    .delete(delete_movie)
                    .route_layer(write()),
            ),
        )
}
