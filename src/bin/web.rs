//! Command surface and keep-alive server for the tournament bot.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. See `Config::load` for the environment it reads.
//!
//! The calling member is identified by the `X-Actor-Id`, `X-Actor-Name` and
//! `X-Actor-Roles` (comma-separated role ids) headers.

use actix_web::{
    get, post,
    web::{self, Data, Json, Query},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use guild_tournament_bot::{
    audit::DEFAULT_VIEW_LIMIT, render, Actor, AdminRoles, Announcement, Config, DisplayIdentity,
    ErrorKind, JsonFileAuditLog, JsonFileStore, MembershipDirectory, ParticipantId,
    ServiceError, TournamentService,
};
use serde::Deserialize;

type Service = TournamentService<JsonFileStore, JsonFileAuditLog>;

struct AppContext {
    service: Service,
    admins: AdminRoles,
}

type AppState = Data<AppContext>;

/// Renders every id with the platform's mention syntax; the chat client resolves names.
struct MentionDirectory;

impl MembershipDirectory for MentionDirectory {
    fn resolve(&self, id: ParticipantId) -> Option<DisplayIdentity> {
        Some(DisplayIdentity::member(id, id.to_string()))
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct StartSoloBody {
    name: String,
    participants: Vec<ParticipantId>,
}

#[derive(Deserialize)]
struct StartTeamBody {
    name: String,
    team_a_name: String,
    team_b_name: String,
}

#[derive(Deserialize)]
struct WinnerBody {
    winner: ParticipantId,
}

#[derive(Deserialize)]
struct LogsQuery {
    event_type: Option<String>,
    limit: Option<usize>,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// The calling member, from request headers.
fn actor_from(req: &HttpRequest) -> Result<Actor, HttpResponse> {
    let id = header(req, "X-Actor-Id")
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| {
            HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": "Missing or invalid X-Actor-Id header" }))
        })?;
    let name = header(req, "X-Actor-Name").unwrap_or_default();
    let roles = header(req, "X-Actor-Roles")
        .unwrap_or_default()
        .split(',')
        .filter_map(|r| r.trim().parse().ok());
    Ok(Actor::new(id, name).with_roles(roles))
}

/// The calling member, if they hold an admin role.
fn admin_from(req: &HttpRequest, state: &AppState) -> Result<Actor, HttpResponse> {
    let actor = actor_from(req)?;
    if !state.admins.is_admin(&actor) {
        log::info!("Permission denied for {} ({})", actor.name, actor.id);
        return Err(HttpResponse::Forbidden().json(serde_json::json!({ "error": "Permission denied." })));
    }
    Ok(actor)
}

fn error_response(e: ServiceError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        Some(ErrorKind::Validation) => HttpResponse::BadRequest().json(body),
        Some(ErrorKind::Conflict) => HttpResponse::Conflict().json(body),
        Some(ErrorKind::NotFound) => HttpResponse::NotFound().json(body),
        None => {
            log::error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn announcement_response(ann: Announcement) -> HttpResponse {
    let text = ann.to_string();
    HttpResponse::Ok().json(serde_json::json!({ "announcement": ann, "text": text }))
}

/// Run a service call off the async workers (it does file I/O) and map the result.
async fn run<F>(state: AppState, call: F) -> HttpResponse
where
    F: FnOnce(&AppContext) -> Result<Announcement, ServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || call(state.get_ref())).await {
        Ok(Ok(ann)) => announcement_response(ann),
        Ok(Err(e)) => error_response(e),
        Err(e) => {
            log::error!("Service task failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "internal error" }))
        }
    }
}

/// Keep-alive ping target.
#[get("/")]
async fn keep_alive() -> impl Responder {
    "I'm alive!"
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "guild-tournament-bot",
    })
}

#[get("/api/help")]
async fn api_help() -> HttpResponse {
    announcement_response(render::help_view())
}

/// Status of the current tournament (anyone).
#[get("/api/tournament")]
async fn api_status(state: AppState) -> HttpResponse {
    run(state, |ctx| ctx.service.status(&MentionDirectory)).await
}

/// [ADMIN] Start a 1v1 bracket with 4, 8 or 16 players.
#[post("/api/tournament/solo")]
async fn api_start_solo(state: AppState, req: HttpRequest, body: Json<StartSoloBody>) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    run(state, move |ctx| {
        ctx.service
            .start_solo(&actor, &body.name, &body.participants, &MentionDirectory)
    })
    .await
}

/// [ADMIN] Declare the winner of a solo bracket match.
#[post("/api/tournament/solo/winner")]
async fn api_solo_winner(state: AppState, req: HttpRequest, body: Json<WinnerBody>) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let winner = body.winner;
    run(state, move |ctx| {
        ctx.service.declare_winner(&actor, winner, &MentionDirectory)
    })
    .await
}

/// [ADMIN] Open a team tournament for registration.
#[post("/api/tournament/team")]
async fn api_start_team(state: AppState, req: HttpRequest, body: Json<StartTeamBody>) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    run(state, move |ctx| {
        ctx.service
            .start_team(&actor, &body.name, &body.team_a_name, &body.team_b_name)
    })
    .await
}

/// Join the team tournament pool (any member).
#[post("/api/tournament/team/join")]
async fn api_join_pool(state: AppState, req: HttpRequest) -> HttpResponse {
    let actor = match actor_from(&req) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    run(state, move |ctx| ctx.service.join_pool(&actor)).await
}

/// [ADMIN] Split the pool into teams and post the first fight card.
#[post("/api/tournament/team/assign")]
async fn api_assign_teams(state: AppState, req: HttpRequest) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    run(state, move |ctx| ctx.service.assign_teams(&actor, &MentionDirectory)).await
}

/// [ADMIN] Declare the winner of a fight-card match.
#[post("/api/tournament/team/winner")]
async fn api_team_winner(state: AppState, req: HttpRequest, body: Json<WinnerBody>) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let winner = body.winner;
    run(state, move |ctx| {
        ctx.service
            .declare_team_winner(&actor, winner, &MentionDirectory)
    })
    .await
}

/// [ADMIN] Generate the next fight-card round.
#[post("/api/tournament/team/next-round")]
async fn api_next_round(state: AppState, req: HttpRequest) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    run(state, move |ctx| {
        ctx.service.advance_fight_card(&actor, &MentionDirectory)
    })
    .await
}

/// [ADMIN] End the current tournament and clear its data.
#[post("/api/tournament/end")]
async fn api_end(state: AppState, req: HttpRequest) -> HttpResponse {
    let actor = match admin_from(&req, &state) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    run(state, move |ctx| ctx.service.end(&actor)).await
}

/// [ADMIN] Recent audit log entries, optionally of one event type.
#[get("/api/logs")]
async fn api_logs(state: AppState, req: HttpRequest, query: Query<LogsQuery>) -> HttpResponse {
    if let Err(resp) = admin_from(&req, &state) {
        return resp;
    }
    let LogsQuery { event_type, limit } = query.into_inner();
    run(state, move |ctx| {
        ctx.service
            .view_logs(event_type.as_deref(), limit.unwrap_or(DEFAULT_VIEW_LIMIT))
    })
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load();
    if config.admin_role_ids.is_empty() {
        log::warn!("No admin role ids configured; admin commands will be refused");
    }
    log::info!(
        "Tournament data in {} (corrupt records: {:?})",
        config.data_dir.display(),
        config.corrupt_record_policy
    );

    let store = JsonFileStore::new(&config.data_dir, config.corrupt_record_policy);
    let audit = JsonFileAuditLog::new(config.audit_log_path());
    let state = Data::new(AppContext {
        service: TournamentService::new(store, audit),
        admins: config.admin_roles(),
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(keep_alive)
            .service(api_health)
            .service(api_help)
            .service(api_status)
            .service(api_start_solo)
            .service(api_solo_winner)
            .service(api_start_team)
            .service(api_join_pool)
            .service(api_assign_teams)
            .service(api_team_winner)
            .service(api_next_round)
            .service(api_end)
            .service(api_logs)
            .default_service(web::to(|| async {
                HttpResponse::NotFound().json(serde_json::json!({ "error": "Unknown command" }))
            }))
    })
    .bind(bind)?
    .run()
    .await
}
