use crate::backend::BackendError;
use crate::dashboard::{ActionError, Dashboard};
use crate::errors::{failure_message, AppError};
use crate::heatmap::{build_heatmap, completed_cells, heatmap_cutoff};
use crate::models::{CalendarCell, DashboardView, HabitStats, Session};
use crate::session::{access_token, clear_session, session_cookie, Authenticated};
use crate::state::AppState;
use crate::suggestions::suggestion;
use crate::ui::{
    render_callback_failure, render_dashboard, render_dashboard_failure, render_landing,
    render_login, render_register, DashboardPage, HabitForm, Overlay,
};
use crate::validation::{validate_habit, validate_login, validate_registration};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub calendar: Option<String>,
    #[serde(default)]
    pub stats: Option<String>,
    #[serde(default)]
    pub evolve: Option<String>,
    #[serde(default)]
    pub suggestion: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewForm {
    #[serde(default)]
    pub archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Deserialize)]
pub struct EvolveForm {
    #[serde(default)]
    pub new_description: String,
    #[serde(default)]
    pub archived: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub habit_id: String,
    pub today: NaiveDate,
    pub completed_days: usize,
    pub cells: Vec<CalendarCell>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub habit_id: String,
    pub completed: bool,
    pub current_streak: u32,
}

pub async fn index(jar: CookieJar) -> Html<String> {
    Html(render_landing(access_token(&jar).is_some()))
}

pub async fn login_page() -> Html<String> {
    Html(render_login(None, ""))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = match validate_login(&form.email, &form.password) {
        Ok(credentials) => credentials,
        Err(err) => {
            let html = render_login(Some(&err.to_string()), &form.email);
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
        }
    };

    match state
        .backend
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
    {
        Ok(session) => start_session(&state, jar, session),
        Err(err) => {
            warn!(error = %err, "sign in failed");
            let message = match err {
                BackendError::Unauthorized | BackendError::Status { status: 400, .. } => {
                    "Invalid email or password".to_string()
                }
                _ => failure_message("sign in"),
            };
            let html = render_login(Some(&message), &credentials.email);
            (StatusCode::UNAUTHORIZED, Html(html)).into_response()
        }
    }
}

pub async fn register_page() -> Html<String> {
    Html(render_register(None, None, ""))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let credentials =
        match validate_registration(&form.email, &form.password, &form.confirm_password) {
            Ok(credentials) => credentials,
            Err(err) => {
                let html = render_register(Some(&err.to_string()), None, &form.email);
                return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
            }
        };

    match state
        .backend
        .sign_up(&credentials.email, &credentials.password)
        .await
    {
        Ok(response) => match response.session {
            Some(session) => start_session(&state, jar, session),
            None => {
                info!("sign up pending email confirmation");
                let notice = "Check your email to confirm your account, then sign in.";
                Html(render_register(None, Some(notice), &credentials.email)).into_response()
            }
        },
        Err(err) => {
            error!(error = %err, "sign up failed");
            let html = render_register(Some(&failure_message("create your account")), None, &credentials.email);
            (StatusCode::BAD_GATEWAY, Html(html)).into_response()
        }
    }
}

pub async fn auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(err) = query.error {
        let message = query.error_description.unwrap_or(err);
        warn!(error = %message, "auth provider returned an error");
        return callback_failure(&message);
    }

    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        return callback_failure("The sign-in link is missing its code.");
    };

    match state.backend.exchange_code_for_session(&code).await {
        Ok(session) => start_session(&state, jar, session),
        Err(err) => {
            error!(error = %err, "failed to exchange auth code");
            callback_failure("The sign-in link is invalid or has expired.")
        }
    }
}

fn callback_failure(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Html(render_callback_failure(message))).into_response()
}

fn start_session(state: &AppState, jar: CookieJar, session: Session) -> Response {
    if let Some(user) = &session.user {
        info!(user_id = %user.id, "session started");
    }
    let jar = jar.add(session_cookie(session.access_token, state.secure_cookies));
    (jar, Redirect::to("/dashboard")).into_response()
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = access_token(&jar) {
        if let Err(err) = state.backend.sign_out(&token).await {
            error!(error = %err, "sign out failed");
        }
    }
    (clear_session(jar), Redirect::to("/")).into_response()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn dashboard_url(archived: bool) -> &'static str {
    if archived {
        "/dashboard?archived=true"
    } else {
        "/dashboard"
    }
}

/// A dashboard for this user that fetches nothing until it has to render.
fn lazy_dashboard(auth: &Authenticated, archived: bool) -> Dashboard {
    Dashboard::new(auth.store.clone(), auth.tracker(today()), archived)
}

async fn load_dashboard(auth: &Authenticated, archived: bool) -> Result<Dashboard, BackendError> {
    let mut dashboard = lazy_dashboard(auth, archived);
    dashboard
        .ensure_loaded()
        .await
        .inspect_err(|err| error!(error = %err, "failed to load habits"))?;
    Ok(dashboard)
}

fn load_failure(auth: &Authenticated, err: BackendError) -> Response {
    if err.is_unauthorized() {
        return Redirect::to("/login").into_response();
    }
    let html = render_dashboard_failure(auth.user.email.as_deref(), &failure_message("load habits"));
    (StatusCode::BAD_GATEWAY, Html(html)).into_response()
}

pub async fn dashboard(auth: Authenticated, Query(query): Query<DashboardQuery>) -> Response {
    let archived = query.archived.unwrap_or(false);
    let dashboard = match load_dashboard(&auth, archived).await {
        Ok(dashboard) => dashboard,
        Err(err) => return load_failure(&auth, err),
    };
    let form = query
        .suggestion
        .and_then(suggestion)
        .map(HabitForm::from)
        .unwrap_or_default();

    render_page(&auth, &dashboard, &query, None, form, None).await
}

/// Renders the dashboard, fetching whichever overlay the query asks for.
async fn render_page(
    auth: &Authenticated,
    dashboard: &Dashboard,
    query: &DashboardQuery,
    banner: Option<String>,
    form: HabitForm,
    proposed: Option<&str>,
) -> Response {
    let view = dashboard.view(query.q.as_deref().unwrap_or_default(), query.tag.as_deref());
    let mut banner = banner;

    let overlay_habit = |id: &Option<String>| {
        id.as_deref()
            .and_then(|id| view.habits.iter().find(|row| row.habit.habit.id == id))
    };

    let cells;
    let stats;
    let overlay = if let Some(habit) = overlay_habit(&query.calendar) {
        match dashboard.calendar(&habit.habit.habit.id).await {
            Ok(fetched) => {
                cells = fetched;
                Some(Overlay::Calendar { habit, cells: &cells })
            }
            Err(_) => {
                banner.get_or_insert_with(|| failure_message("load the calendar"));
                None
            }
        }
    } else if let Some(habit) = overlay_habit(&query.stats) {
        match dashboard.stats(&habit.habit.habit.id).await {
            Ok(fetched) => {
                stats = fetched;
                Some(Overlay::Stats { habit, stats: &stats })
            }
            Err(_) => {
                banner.get_or_insert_with(|| failure_message("load statistics"));
                None
            }
        }
    } else {
        overlay_habit(&query.evolve).map(|habit| Overlay::Evolve {
            habit,
            proposed: proposed.unwrap_or_default(),
        })
    };

    let status = if banner.is_some() { StatusCode::BAD_GATEWAY } else { StatusCode::OK };
    let html = render_dashboard(&DashboardPage {
        view: &view,
        email: auth.user.email.as_deref(),
        banner: banner.as_deref(),
        overlay,
        form,
    });
    (status, Html(html)).into_response()
}

/// Shows the dashboard again with the failure message instead of redirecting.
async fn action_failure(
    auth: &Authenticated,
    dashboard: &mut Dashboard,
    err: AppError,
    form: HabitForm,
    reopen_evolve: Option<(&str, &str)>,
) -> Response {
    if err.status == StatusCode::UNAUTHORIZED {
        return Redirect::to("/login").into_response();
    }
    if let Err(load_err) = dashboard.ensure_loaded().await {
        error!(error = %load_err, "failed to load habits");
        return load_failure(auth, load_err);
    }
    let query = DashboardQuery {
        archived: Some(dashboard.archived()),
        evolve: reopen_evolve.map(|(id, _)| id.to_string()),
        ..Default::default()
    };
    let mut response = render_page(
        auth,
        &*dashboard,
        &query,
        Some(err.message),
        form,
        reopen_evolve.map(|(_, proposed)| proposed),
    )
    .await;
    *response.status_mut() = err.status;
    response
}

pub async fn create_habit(auth: Authenticated, Form(form): Form<CreateHabitForm>) -> Response {
    let mut dashboard = lazy_dashboard(&auth, false);
    let result = match validate_habit(&form.name, &form.description, &form.tags) {
        Ok(draft) => dashboard.create(&auth.user.id, draft).await,
        Err(err) => Err(ActionError::from(err)),
    };
    match result {
        Ok(()) => Redirect::to("/dashboard").into_response(),
        Err(err) => {
            let err = AppError::from_action("create habit", err);
            let prefill = HabitForm {
                name: form.name,
                description: form.description,
                tags: form.tags,
            };
            action_failure(&auth, &mut dashboard, err, prefill, None).await
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum HabitAction {
    Complete,
    Uncomplete,
    Archive,
    Unarchive,
    Delete,
}

impl HabitAction {
    fn describe(self) -> &'static str {
        match self {
            Self::Complete => "complete habit",
            Self::Uncomplete => "undo completion",
            Self::Archive => "archive habit",
            Self::Unarchive => "restore habit",
            Self::Delete => "delete habit",
        }
    }

    async fn apply(self, dashboard: &mut Dashboard, habit_id: &str) -> Result<(), ActionError> {
        match self {
            Self::Complete => dashboard.complete(habit_id).await,
            Self::Uncomplete => dashboard.uncomplete(habit_id).await,
            Self::Archive => dashboard.archive(habit_id).await,
            Self::Unarchive => dashboard.unarchive(habit_id).await,
            Self::Delete => dashboard.delete(habit_id).await,
        }
    }
}

async fn run_action(
    auth: Authenticated,
    habit_id: String,
    form: ViewForm,
    action: HabitAction,
) -> Response {
    let archived = form.archived.unwrap_or(false);
    let mut dashboard = lazy_dashboard(&auth, archived);

    match action.apply(&mut dashboard, &habit_id).await {
        Ok(()) => Redirect::to(dashboard_url(archived)).into_response(),
        Err(err) => {
            let err = AppError::from_action(action.describe(), err);
            action_failure(&auth, &mut dashboard, err, HabitForm::default(), None).await
        }
    }
}

pub async fn complete_habit(
    auth: Authenticated,
    Path(habit_id): Path<String>,
    Form(form): Form<ViewForm>,
) -> Response {
    run_action(auth, habit_id, form, HabitAction::Complete).await
}

pub async fn uncomplete_habit(
    auth: Authenticated,
    Path(habit_id): Path<String>,
    Form(form): Form<ViewForm>,
) -> Response {
    run_action(auth, habit_id, form, HabitAction::Uncomplete).await
}

pub async fn archive_habit(
    auth: Authenticated,
    Path(habit_id): Path<String>,
    Form(form): Form<ViewForm>,
) -> Response {
    run_action(auth, habit_id, form, HabitAction::Archive).await
}

pub async fn unarchive_habit(
    auth: Authenticated,
    Path(habit_id): Path<String>,
    Form(form): Form<ViewForm>,
) -> Response {
    run_action(auth, habit_id, form, HabitAction::Unarchive).await
}

pub async fn delete_habit(
    auth: Authenticated,
    Path(habit_id): Path<String>,
    Form(form): Form<ViewForm>,
) -> Response {
    run_action(auth, habit_id, form, HabitAction::Delete).await
}

pub async fn evolve_habit(
    auth: Authenticated,
    Path(habit_id): Path<String>,
    Form(form): Form<EvolveForm>,
) -> Response {
    let archived = form.archived.unwrap_or(false);
    let mut dashboard = lazy_dashboard(&auth, archived);

    match dashboard.evolve(&habit_id, &form.new_description).await {
        Ok(()) => Redirect::to(dashboard_url(archived)).into_response(),
        Err(err) => {
            let err = AppError::from_action("evolve habit", err);
            let reopen = Some((habit_id.as_str(), form.new_description.as_str()));
            action_failure(&auth, &mut dashboard, err, HabitForm::default(), reopen).await
        }
    }
}

pub async fn api_dashboard(
    auth: Authenticated,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let dashboard = load_dashboard(&auth, query.archived.unwrap_or(false))
        .await
        .map_err(|err| AppError::from_backend("load habits", err))?;
    Ok(Json(dashboard.view(
        query.q.as_deref().unwrap_or_default(),
        query.tag.as_deref(),
    )))
}

pub async fn api_calendar(
    auth: Authenticated,
    Path(habit_id): Path<String>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = today();
    let dates = auth
        .store
        .completion_dates_since(&habit_id, heatmap_cutoff(today))
        .await
        .map_err(|err| {
            error!(habit_id = %habit_id, error = %err, "failed to fetch completion history");
            AppError::from_backend("load the calendar", err)
        })?;
    let cells = build_heatmap(today, &dates);

    Ok(Json(CalendarResponse {
        completed_days: completed_cells(&cells),
        habit_id,
        today,
        cells,
    }))
}

pub async fn api_stats(
    auth: Authenticated,
    Path(habit_id): Path<String>,
) -> Result<Json<HabitStats>, AppError> {
    let stats = auth.store.habit_stats(&habit_id).await.map_err(|err| {
        error!(habit_id = %habit_id, error = %err, "failed to fetch habit stats");
        AppError::from_backend("load statistics", err)
    })?;
    Ok(Json(stats))
}

pub async fn api_toggle(
    auth: Authenticated,
    Path(habit_id): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    let mut dashboard = load_dashboard(&auth, false)
        .await
        .map_err(|err| AppError::from_backend("load habits", err))?;
    let completed = dashboard
        .toggle(&habit_id)
        .await
        .map_err(|err| AppError::from_action("update completion", err))?;
    let current_streak = dashboard
        .habit(&habit_id)
        .map(|item| item.current_streak)
        .unwrap_or(0);

    Ok(Json(ToggleResponse {
        habit_id,
        completed,
        current_streak,
    }))
}
