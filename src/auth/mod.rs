use crate::state::AppState;
use axum::Router;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod repo;
pub mod services;
mod token;

pub use dto::SessionUser;
pub use extractors::AuthUser;
pub use repo::AccountType;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
