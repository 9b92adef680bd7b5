pub mod chat;
pub mod error;
pub mod status;
pub mod thread;

use crate::state::AppState;
use axum::Router;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(thread::routes(state))
        .merge(status::routes())
}
