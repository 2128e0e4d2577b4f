use crate::heatmap::{completed_cells, date_key, week_columns, HEATMAP_DAYS};
use crate::models::{CalendarCell, DashboardView, HabitRow, HabitStats, Suggestion};
use crate::suggestions::SUGGESTIONS;
use std::fmt::Write as _;

/// Prefilled values for the creation form.
#[derive(Debug, Clone, Default)]
pub struct HabitForm {
    pub name: String,
    pub description: String,
    pub tags: String,
}

impl From<&Suggestion> for HabitForm {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            name: suggestion.name.to_string(),
            description: suggestion.description.to_string(),
            tags: suggestion.tags_field(),
        }
    }
}

pub enum Overlay<'a> {
    Calendar {
        habit: &'a HabitRow,
        cells: &'a [CalendarCell],
    },
    Stats {
        habit: &'a HabitRow,
        stats: &'a HabitStats,
    },
    Evolve {
        habit: &'a HabitRow,
        proposed: &'a str,
    },
}

pub struct DashboardPage<'a> {
    pub view: &'a DashboardView,
    pub email: Option<&'a str>,
    pub banner: Option<&'a str>,
    pub overlay: Option<Overlay<'a>>,
    pub form: HabitForm,
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{BODY}}", body)
}

fn banner(class: &str, message: Option<&str>) -> String {
    message
        .map(|text| format!(r#"<p class="banner {class}" role="alert">{}</p>"#, escape(text)))
        .unwrap_or_default()
}

pub fn render_landing(signed_in: bool) -> String {
    let actions = if signed_in {
        r#"<a class="button" href="/dashboard">Open your habits</a>"#.to_string()
    } else {
        r#"<a class="button" href="/register">Get started</a>
        <a class="button ghost" href="/login">Sign in</a>"#
            .to_string()
    };
    let body = LANDING_HTML.replace("{{ACTIONS}}", &actions);
    layout("Minimal Habits", &body)
}

pub fn render_login(error: Option<&str>, email: &str) -> String {
    let body = LOGIN_HTML
        .replace("{{ERROR}}", &banner("error", error))
        .replace("{{EMAIL}}", &escape(email));
    layout("Sign in", &body)
}

pub fn render_register(error: Option<&str>, notice: Option<&str>, email: &str) -> String {
    let body = REGISTER_HTML
        .replace("{{ERROR}}", &banner("error", error))
        .replace("{{NOTICE}}", &banner("notice", notice))
        .replace("{{EMAIL}}", &escape(email));
    layout("Create account", &body)
}

pub fn render_callback_failure(message: &str) -> String {
    let body = CALLBACK_FAILURE_HTML.replace("{{MESSAGE}}", &escape(message));
    layout("Sign-in failed", &body)
}

/// Hidden inputs that carry the current filter and archival switch across forms.
fn view_state(view: &DashboardView) -> String {
    let mut out = String::new();
    if !view.query.is_empty() {
        let _ = write!(out, r#"<input type="hidden" name="q" value="{}">"#, escape(&view.query));
    }
    if let Some(tag) = &view.selected_tag {
        let _ = write!(out, r#"<input type="hidden" name="tag" value="{}">"#, escape(tag));
    }
    if view.archived {
        out.push_str(r#"<input type="hidden" name="archived" value="true">"#);
    }
    out
}

fn archived_field(view: &DashboardView) -> &'static str {
    if view.archived {
        r#"<input type="hidden" name="archived" value="true">"#
    } else {
        ""
    }
}

fn action_form(view: &DashboardView, habit_id: &str, action: &str, label: &str, class: &str) -> String {
    format!(
        r#"<form method="post" action="/dashboard/habits/{id}/{action}" onsubmit="this.querySelector('button').disabled = true">{archived}<button class="{class}" type="submit">{label}</button></form>"#,
        id = escape(habit_id),
        archived = archived_field(view),
    )
}

fn overlay_button(view: &DashboardView, habit_id: &str, param: &str, label: &str) -> String {
    format!(
        r#"<form method="get" action="/dashboard">{state}<input type="hidden" name="{param}" value="{id}"><button class="ghost" type="submit">{label}</button></form>"#,
        state = view_state(view),
        id = escape(habit_id),
    )
}

fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape(tag)))
        .collect()
}

fn render_habit(view: &DashboardView, row: &HabitRow) -> String {
    let habit = &row.habit.habit;
    let description = habit
        .description
        .as_deref()
        .map(|text| format!(r#"<p class="description">{}</p>"#, escape(text)))
        .unwrap_or_default();

    let mut actions = String::new();
    if view.archived {
        actions.push_str(&action_form(view, &habit.id, "unarchive", "Restore", "ghost"));
        actions.push_str(&action_form(view, &habit.id, "delete", "Delete", "danger"));
    } else {
        if row.completed_today {
            actions.push_str(&action_form(view, &habit.id, "uncomplete", "Undo", "done"));
        } else {
            actions.push_str(&action_form(view, &habit.id, "complete", "Done today", "primary"));
        }
        actions.push_str(&overlay_button(view, &habit.id, "calendar", "Calendar"));
        actions.push_str(&overlay_button(view, &habit.id, "stats", "Stats"));
        actions.push_str(&overlay_button(view, &habit.id, "evolve", "Evolve"));
        actions.push_str(&action_form(view, &habit.id, "archive", "Archive", "ghost"));
    }

    let streak = row.habit.current_streak;
    format!(
        r#"<li class="habit{done}">
  <div class="habit-head">
    <h3>{name}</h3>
    <span class="streak" title="Current streak">{streak} day{plural}</span>
  </div>
  {description}
  <div class="tags">{tags}</div>
  <div class="actions">{actions}</div>
</li>"#,
        done = if row.completed_today { " completed" } else { "" },
        name = escape(&habit.name),
        plural = if streak == 1 { "" } else { "s" },
        tags = render_tags(habit.tags()),
    )
}

fn render_filters(view: &DashboardView) -> String {
    let mut options = String::from(r#"<option value="">All tags</option>"#);
    for tag in &view.tags {
        let selected = if view.selected_tag.as_deref() == Some(tag.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{value}"{selected}>{value}</option>"#,
            value = escape(tag)
        );
    }

    let switch_label = if view.archived { "Show active" } else { "Show archived" };
    let switch_value = if view.archived { "" } else { r#"<input type="hidden" name="archived" value="true">"# };

    format!(
        r#"<div class="filters">
  <form method="get" action="/dashboard" class="search">
    {archived}
    <input type="search" name="q" placeholder="Search habits" value="{query}">
    <select name="tag">{options}</select>
    <button type="submit">Filter</button>
  </form>
  <form method="get" action="/dashboard">{switch_value}<button class="ghost" type="submit">{switch_label}</button></form>
</div>"#,
        archived = archived_field(view),
        query = escape(&view.query),
    )
}

fn render_summary(view: &DashboardView) -> String {
    let summary = view.summary;
    format!(
        r#"<div class="panel">
  <div class="stat"><span class="label">Habits</span><span class="value" id="total">{total}</span></div>
  <div class="stat"><span class="label">Done today</span><span class="value" id="completed">{completed}</span></div>
  <div class="stat"><span class="label">Completion</span><span class="value" id="rate">{rate}%</span></div>
</div>"#,
        total = summary.total,
        completed = summary.completed_count,
        rate = summary.rate,
    )
}

fn render_create_form(form: &HabitForm) -> String {
    let suggestions: String = SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                r#"<a class="suggestion" href="/dashboard?suggestion={index}">{}</a>"#,
                escape(item.name)
            )
        })
        .collect();

    format!(
        r#"<section class="create">
  <h2>New minimal habit</h2>
  <div class="suggestions">{suggestions}</div>
  <form method="post" action="/dashboard/habits" onsubmit="this.querySelector('button').disabled = true">
    <input name="name" maxlength="255" required placeholder="Read one page" value="{name}">
    <input name="description" placeholder="What does done look like?" value="{description}">
    <input name="tags" placeholder="Tags, comma separated" value="{tags}">
    <button class="primary" type="submit">Add habit</button>
  </form>
</section>"#,
        name = escape(&form.name),
        description = escape(&form.description),
        tags = escape(&form.tags),
    )
}

fn close_link(view: &DashboardView) -> String {
    format!(
        r#"<form method="get" action="/dashboard" class="close">{}<button class="ghost" type="submit">Close</button></form>"#,
        view_state(view)
    )
}

fn render_calendar(cells: &[CalendarCell]) -> String {
    let mut grid = String::new();
    for column in week_columns(cells) {
        grid.push_str(r#"<div class="week">"#);
        for cell in column {
            let mut class = String::from("day");
            if cell.completed {
                class.push_str(" completed");
            }
            if cell.is_today {
                class.push_str(" today");
            }
            let _ = write!(grid, r#"<span class="{class}" title="{date}"></span>"#, date = date_key(cell.date));
        }
        grid.push_str("</div>");
    }
    format!(
        r#"<div class="heatmap">{grid}</div><p class="caption">{done} of the last {HEATMAP_DAYS} days</p>"#,
        done = completed_cells(cells),
    )
}

fn render_stats(stats: &HabitStats) -> String {
    format!(
        r#"<dl class="stats">
  <dt>Current streak</dt><dd>{current}</dd>
  <dt>Longest streak</dt><dd>{longest}</dd>
  <dt>Total completions</dt><dd>{total}</dd>
  <dt>Days missed</dt><dd>{failed}</dd>
  <dt>Success rate</dt><dd>{rate:.1}%</dd>
  <dt>Days since creation</dt><dd>{age}</dd>
</dl>"#,
        current = stats.current_streak,
        longest = stats.longest_streak,
        total = stats.total_completions,
        failed = stats.days_failed,
        rate = stats.success_rate,
        age = stats.days_since_creation,
    )
}

fn render_evolve(view: &DashboardView, row: &HabitRow, proposed: &str) -> String {
    let current = row.habit.habit.description.as_deref().unwrap_or("No description yet");
    format!(
        r#"<p class="description">Currently: {current}</p>
<form method="post" action="/dashboard/habits/{id}/evolve" onsubmit="this.querySelector('button').disabled = true">
  {archived}
  <input name="new_description" required placeholder="Two pages" value="{proposed}">
  <button class="primary" type="submit">Evolve</button>
</form>"#,
        current = escape(current),
        id = escape(&row.habit.habit.id),
        archived = archived_field(view),
        proposed = escape(proposed),
    )
}

fn render_overlay(view: &DashboardView, overlay: &Overlay<'_>) -> String {
    let (habit, title, content) = match overlay {
        Overlay::Calendar { habit, cells } => (habit, "Last 90 days", render_calendar(cells)),
        Overlay::Stats { habit, stats } => (habit, "Statistics", render_stats(stats)),
        Overlay::Evolve { habit, proposed } => (habit, "Evolve habit", render_evolve(view, habit, proposed)),
    };
    format!(
        r#"<div class="overlay" role="dialog">
  <div class="modal">
    <div class="modal-head"><h2>{title}: {name}</h2>{close}</div>
    {content}
  </div>
</div>"#,
        name = escape(&habit.habit.habit.name),
        close = close_link(view),
    )
}

pub fn render_dashboard(page: &DashboardPage<'_>) -> String {
    let view = page.view;
    let habits: String = if view.habits.is_empty() {
        let message = if view.archived {
            "No archived habits."
        } else if view.query.is_empty() && view.selected_tag.is_none() {
            "No habits yet. Start with something tiny."
        } else {
            "No habits match this filter."
        };
        format!(r#"<li class="empty">{message}</li>"#)
    } else {
        view.habits.iter().map(|row| render_habit(view, row)).collect()
    };

    let create = if view.archived {
        String::new()
    } else {
        render_create_form(&page.form)
    };
    let overlay = page
        .overlay
        .as_ref()
        .map(|overlay| render_overlay(view, overlay))
        .unwrap_or_default();
    let heading = if view.archived { "Archived habits" } else { "Today" };

    let body = DASHBOARD_HTML
        .replace("{{HEADING}}", heading)
        .replace("{{DATE}}", &date_key(view.today))
        .replace("{{EMAIL}}", &escape(page.email.unwrap_or_default()))
        .replace("{{BANNER}}", &banner("error", page.banner))
        .replace("{{SUMMARY}}", &render_summary(view))
        .replace("{{FILTERS}}", &render_filters(view))
        .replace("{{HABITS}}", &habits)
        .replace("{{CREATE}}", &create)
        .replace("{{OVERLAY}}", &overlay);
    layout("Dashboard", &body)
}

pub fn render_dashboard_failure(email: Option<&str>, message: &str) -> String {
    let body = DASHBOARD_FAILURE_HTML
        .replace("{{EMAIL}}", &escape(email.unwrap_or_default()))
        .replace("{{MESSAGE}}", &escape(message));
    layout("Dashboard", &body)
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #d9ecd0;
      --ink: #2b2a28;
      --accent: #3f8f5a;
      --accent-2: #2f4858;
      --danger: #c2412d;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #eef6e8 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1, h2 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    h1 {
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    .subtitle, .caption, .description {
      margin: 0;
      color: #5f5c57;
    }

    .topbar, .habit-head, .modal-head, .filters {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
      flex-wrap: wrap;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 16px 20px;
      display: grid;
      gap: 4px;
    }

    .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #7a766f;
    }

    .value {
      font-size: 1.8rem;
      font-weight: 600;
    }

    form {
      display: inline-flex;
      gap: 8px;
      flex-wrap: wrap;
    }

    form.stacked {
      display: grid;
      gap: 12px;
    }

    input, select {
      font: inherit;
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid #d6d0c4;
      background: white;
    }

    button, .button {
      font: inherit;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      text-decoration: none;
    }

    button:disabled {
      opacity: 0.5;
      cursor: progress;
    }

    .primary { background: var(--accent); }
    .done { background: #9dbfa6; }
    .danger { background: var(--danger); }
    .ghost { background: transparent; color: var(--accent-2); border: 1px solid var(--accent-2); }

    .habits {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 14px;
    }

    .habit {
      background: white;
      border-radius: 18px;
      padding: 18px 20px;
      display: grid;
      gap: 10px;
    }

    .habit.completed {
      border-left: 6px solid var(--accent);
    }

    .habit h3 {
      margin: 0;
    }

    .streak {
      font-weight: 600;
      color: var(--accent);
    }

    .tags, .actions, .suggestions {
      display: flex;
      gap: 8px;
      flex-wrap: wrap;
    }

    .tag, .suggestion {
      font-size: 0.85rem;
      padding: 4px 10px;
      border-radius: 999px;
      background: #eef1ea;
      color: var(--accent-2);
      text-decoration: none;
    }

    .banner {
      margin: 0;
      padding: 12px 16px;
      border-radius: 12px;
    }

    .banner.error { background: #fbe4df; color: var(--danger); }
    .banner.notice { background: #e3f1e6; color: var(--accent); }

    .overlay {
      position: fixed;
      inset: 0;
      background: rgba(43, 42, 40, 0.45);
      display: grid;
      place-items: center;
      padding: 18px;
    }

    .modal {
      width: min(620px, 100%);
      background: white;
      border-radius: 24px;
      padding: 28px;
      display: grid;
      gap: 18px;
    }

    .heatmap {
      display: flex;
      gap: 4px;
    }

    .week {
      display: grid;
      grid-template-rows: repeat(7, 14px);
      gap: 4px;
    }

    .day {
      width: 14px;
      height: 14px;
      border-radius: 4px;
      background: #ebe7df;
    }

    .day.completed { background: var(--accent); }
    .day.today { outline: 2px solid var(--accent-2); }

    .stats {
      display: grid;
      grid-template-columns: 1fr auto;
      gap: 8px 24px;
      margin: 0;
    }

    .stats dd {
      margin: 0;
      font-weight: 600;
    }

    .empty {
      color: #7a766f;
      padding: 18px 0;
    }
  </style>
</head>
<body>
  <main class="app">
{{BODY}}
  </main>
</body>
</html>
"#;

const LANDING_HTML: &str = r#"    <header>
      <h1>Minimal Habits</h1>
      <p class="subtitle">Pick habits so small you cannot fail. Keep the streak, then evolve them.</p>
    </header>
    <div class="actions">
        {{ACTIONS}}
    </div>"#;

const LOGIN_HTML: &str = r#"    <header>
      <h1>Welcome back</h1>
      <p class="subtitle">Sign in to check off today's habits.</p>
    </header>
    {{ERROR}}
    <form method="post" action="/login" class="stacked">
      <input type="email" name="email" placeholder="Email" value="{{EMAIL}}" required>
      <input type="password" name="password" placeholder="Password" required>
      <button class="primary" type="submit">Sign in</button>
    </form>
    <p class="caption">No account yet? <a href="/register">Create one</a></p>"#;

const REGISTER_HTML: &str = r#"    <header>
      <h1>Create your account</h1>
      <p class="subtitle">Start with one tiny habit.</p>
    </header>
    {{ERROR}}
    {{NOTICE}}
    <form method="post" action="/register" class="stacked">
      <input type="email" name="email" placeholder="Email" value="{{EMAIL}}" required>
      <input type="password" name="password" placeholder="Password (at least 6 characters)" required>
      <input type="password" name="confirm_password" placeholder="Confirm password" required>
      <button class="primary" type="submit">Create account</button>
    </form>
    <p class="caption">Already registered? <a href="/login">Sign in</a></p>"#;

const CALLBACK_FAILURE_HTML: &str = r#"    <header>
      <h1>We could not sign you in</h1>
      <p class="subtitle">{{MESSAGE}}</p>
    </header>
    <div class="actions">
      <a class="button" href="/login">Back to sign in</a>
    </div>"#;

const DASHBOARD_HTML: &str = r#"    <header class="topbar">
      <div>
        <h1>{{HEADING}}</h1>
        <p class="subtitle"><span id="date">{{DATE}}</span> &middot; {{EMAIL}}</p>
      </div>
      <form method="post" action="/logout"><button class="ghost" type="submit">Sign out</button></form>
    </header>
    {{BANNER}}
    {{SUMMARY}}
    {{FILTERS}}
    <ul class="habits">
{{HABITS}}
    </ul>
    {{CREATE}}
    {{OVERLAY}}"#;

const DASHBOARD_FAILURE_HTML: &str = r#"    <header class="topbar">
      <div>
        <h1>Today</h1>
        <p class="subtitle">{{EMAIL}}</p>
      </div>
      <form method="post" action="/logout"><button class="ghost" type="submit">Sign out</button></form>
    </header>
    <p class="banner error" role="alert">{{MESSAGE}}</p>
    <div class="actions"><a class="button" href="/dashboard">Try again</a></div>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::build_heatmap;
    use crate::models::{Habit, HabitWithStreak, SummaryStats};

    fn row(id: &str, name: &str, completed_today: bool) -> HabitRow {
        HabitRow {
            habit: HabitWithStreak {
                habit: Habit {
                    id: id.into(),
                    user_id: None,
                    name: name.into(),
                    description: Some("one page".into()),
                    tags: Some(vec!["mind".into()]),
                    frequency_type: None,
                    is_archived: false,
                    archived_at: None,
                    created_at: "2024-03-01T00:00:00Z".parse().unwrap(),
                },
                current_streak: 1,
            },
            completed_today,
        }
    }

    fn view(habits: Vec<HabitRow>) -> DashboardView {
        DashboardView {
            today: "2024-03-10".parse().unwrap(),
            archived: false,
            query: String::new(),
            selected_tag: None,
            tags: vec!["mind".into()],
            summary: SummaryStats {
                total: habits.len(),
                completed_count: habits.iter().filter(|row| row.completed_today).count(),
                rate: 50,
            },
            habits,
        }
    }

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn placeholders_in_user_text_stay_literal() {
        let mut view = view(vec![row("a", "{{CREATE}}", false)]);
        view.query = "{{HABITS}}".into();
        let html = render_dashboard(&DashboardPage {
            view: &view,
            email: Some("{{OVERLAY}}"),
            banner: None,
            overlay: None,
            form: HabitForm::default(),
        });

        assert_eq!(html.matches(r#"<section class="create">"#).count(), 1);
        assert_eq!(html.matches(r#"<li class="habit"#).count(), 1);
        assert!(html.contains("<h3>&#123;&#123;CREATE&#125;&#125;</h3>"));
        assert!(html.contains(r#"value="&#123;&#123;HABITS&#125;&#125;""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn dashboard_shows_summary_and_toggle_actions() {
        let view = view(vec![row("a", "Read", true), row("b", "<Run>", false)]);
        let html = render_dashboard(&DashboardPage {
            view: &view,
            email: Some("a@b.c"),
            banner: None,
            overlay: None,
            form: HabitForm::default(),
        });

        assert!(html.contains(r#"<span class="value" id="rate">50%</span>"#));
        assert!(html.contains("/dashboard/habits/a/uncomplete"));
        assert!(html.contains("/dashboard/habits/b/complete"));
        assert!(html.contains("&lt;Run&gt;"));
        assert!(html.contains("2024-03-10"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn calendar_overlay_renders_every_day() {
        let view = view(vec![row("a", "Read", false)]);
        let today = view.today;
        let cells = build_heatmap(today, &[today]);
        let html = render_dashboard(&DashboardPage {
            view: &view,
            email: None,
            banner: Some("Failed to complete habit. Please try again."),
            overlay: Some(Overlay::Calendar {
                habit: &view.habits[0],
                cells: &cells,
            }),
            form: HabitForm::default(),
        });

        assert_eq!(html.matches(r#"<span class="day"#).count(), HEATMAP_DAYS);
        assert_eq!(html.matches("day completed today").count(), 1);
        assert!(html.contains("1 of the last 90 days"));
        assert!(html.contains("Failed to complete habit"));
    }

    #[test]
    fn suggestion_prefills_creation_form() {
        let view = view(Vec::new());
        let html = render_dashboard(&DashboardPage {
            view: &view,
            email: None,
            banner: None,
            overlay: None,
            form: HabitForm::from(&SUGGESTIONS[0]),
        });
        assert!(html.contains(r#"value="Read one page""#));
        assert!(html.contains("No habits yet"));
    }
}
