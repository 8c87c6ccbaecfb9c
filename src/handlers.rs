use crate::clock::{format_relative, DateHeader};
use crate::errors::AppError;
use crate::models::{
    Category, RoutineCollection, SectionResponse, SessionQuery, SnapshotResponse, ToggleRequest,
};
use crate::session::{Session, Sessions};
use crate::state::AppState;
use crate::tracker::remaining_message;
use crate::ui::{render_index, IndexView};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Json,
};
use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

/// A page load without a live session token starts over from the seed.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Html<String>, AppError> {
    let now = state.clock.now();
    let header = DateHeader::at(now);
    let mut sessions = state.sessions.lock().await;
    let (token, session) = sessions.resume_or_create(query.session.as_deref());
    let last_check_in = session
        .tracker
        .last_toggled_at()
        .map(|then| format_relative(now, then));

    let html = render_index(
        &IndexView {
            session: &token,
            header: &header,
            routines: session.tracker.routines(),
            last_check_in: last_check_in.as_deref(),
        },
        |id| session.animations.is_active(id),
    )
    .map_err(AppError::internal)?;
    Ok(Html(html))
}

pub async fn create_session(State(state): State<AppState>) -> Result<Json<SnapshotResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let token = sessions.create();
    info!(session = %token, "session started");
    let session = live_session(&mut sessions, Some(token.as_str()))?;
    Ok(Json(snapshot(&token, session, state.clock.now())))
}

pub async fn get_routines(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = live_session(&mut sessions, query.session.as_deref())?;
    let token = query.session.as_deref().unwrap_or_default();
    Ok(Json(snapshot(token, session, state.clock.now())))
}

pub async fn get_section(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SectionResponse>, AppError> {
    let category: Category = tag.parse()?;
    let mut sessions = state.sessions.lock().await;
    let session = live_session(&mut sessions, query.session.as_deref())?;
    Ok(Json(section(category, session.tracker.routines())))
}

pub async fn toggle(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let id = payload.id.trim();
    if id.is_empty() {
        return Err(AppError::bad_request("id must not be empty"));
    }

    let now = state.clock.now();
    let mut sessions = state.sessions.lock().await;
    let session = live_session(&mut sessions, query.session.as_deref())?;
    apply_toggle(session, id, now);
    let token = query.session.as_deref().unwrap_or_default();
    Ok(Json(snapshot(token, session, now)))
}

/// Form fallback. Keeps the session in the redirect so the page shows it.
pub async fn toggle_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Redirect {
    let now = state.clock.now();
    let mut sessions = state.sessions.lock().await;
    match live_session(&mut sessions, query.session.as_deref()) {
        Ok(session) => {
            apply_toggle(session, id.trim(), now);
            redirect_home(query.session.as_deref())
        }
        Err(err) => {
            warn!("form toggle without a live session: {}", err.message);
            redirect_home(None)
        }
    }
}

pub async fn reset(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = live_session(&mut sessions, query.session.as_deref())?;
    session.tracker.reset();
    info!("routines reset to seed");
    let token = query.session.as_deref().unwrap_or_default();
    Ok(Json(snapshot(token, session, state.clock.now())))
}

pub async fn reset_form(State(state): State<AppState>, Query(query): Query<SessionQuery>) -> Redirect {
    let mut sessions = state.sessions.lock().await;
    match live_session(&mut sessions, query.session.as_deref()) {
        Ok(session) => {
            session.tracker.reset();
            info!("routines reset to seed");
            redirect_home(query.session.as_deref())
        }
        Err(_) => redirect_home(None),
    }
}

fn live_session<'a>(
    sessions: &'a mut Sessions,
    token: Option<&str>,
) -> Result<&'a mut Session, AppError> {
    let token = token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("session is required"))?;
    sessions
        .get_mut(token)
        .ok_or_else(|| AppError::not_found(format!("unknown session '{token}'")))
}

fn redirect_home(token: Option<&str>) -> Redirect {
    match token {
        Some(token) => Redirect::to(&format!("/?session={}", urlencoding::encode(token))),
        None => Redirect::to("/"),
    }
}

fn apply_toggle(session: &mut Session, id: &str, now: DateTime<Local>) {
    if session.tracker.toggle(id, now) {
        session.animations.trigger(id);
        let progress = session.tracker.routines().progress();
        info!(
            id,
            completed = progress.completed,
            total = progress.total,
            "routine toggled"
        );
    } else {
        debug!(id, "toggle ignored for unknown routine");
    }
}

fn snapshot(token: &str, session: &Session, now: DateTime<Local>) -> SnapshotResponse {
    let header = DateHeader::at(now);
    let tracker = &session.tracker;
    let routines = tracker.routines();
    let progress = routines.progress();

    SnapshotResponse {
        session: token.to_string(),
        weekday: header.weekday,
        date: header.long_date,
        completed: progress.completed,
        total: progress.total,
        percentage: progress.percentage(),
        remaining_message: remaining_message(&progress),
        last_check_in: tracker.last_toggled_at().map(|then| format_relative(now, then)),
        sections: Category::ALL
            .into_iter()
            .map(|category| section(category, routines))
            .collect(),
    }
}

fn section(category: Category, routines: &RoutineCollection) -> SectionResponse {
    let progress = routines.section_progress(category);
    SectionResponse {
        category,
        title: category.title().to_string(),
        completed: progress.completed,
        total: progress.total,
        routines: routines.get(category).to_vec(),
    }
}
