use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the tic-tac-toe backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::game::start_game,
        crate::routes::game::make_move,
        crate::routes::game::game_state,
        crate::routes::game::settle_game,
        crate::routes::leaderboard::leaderboard,
        crate::routes::users::user_games,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::RegisterRequest,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::LoginResponse,
            crate::dto::auth::MessageResponse,
            crate::dto::game::StartGameRequest,
            crate::dto::game::StartGameResponse,
            crate::dto::game::MakeMoveRequest,
            crate::dto::game::MoveResponse,
            crate::dto::game::MoveOutcomeDto,
            crate::dto::game::GameStatusDto,
            crate::dto::game::GameStateResponse,
            crate::dto::game::MoveSummary,
            crate::dto::game::SettleResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::user::GameHistoryEntry,
            crate::dto::user::HistoryResult,
            crate::state::board::Symbol,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "game", description = "Game lifecycle and moves"),
        (name = "stats", description = "Leaderboard and per-user history"),
    )
)]
pub struct ApiDoc;
