pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use dto::{ApiError, ApiResult, ErrorResponse, GameResponse};
pub use handlers::AppState;
pub use routes::{create_app, create_router};
