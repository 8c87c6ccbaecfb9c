use crate::clock::DateHeader;
use crate::models::{Category, Progress, Routine, RoutineCollection, RoutineError};
use crate::tracker::remaining_message;
use std::f64::consts::PI;

/// Joins the class names whose condition holds.
pub fn class_names(parts: &[(&str, bool)]) -> String {
    parts
        .iter()
        .filter(|(name, enabled)| *enabled && !name.is_empty())
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingConfig {
    /// Outer diameter in pixels.
    pub size: f64,
    pub stroke_width: f64,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            size: 120.0,
            stroke_width: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub radius: f64,
    pub circumference: f64,
    pub dash_offset: f64,
}

impl RingGeometry {
    /// `progress` is not clamped; values outside 0..=100 overshoot the arc.
    pub fn new(progress: f64, config: RingConfig) -> Self {
        let radius = (config.size - config.stroke_width) / 2.0;
        let circumference = radius * 2.0 * PI;
        Self {
            radius,
            circumference,
            dash_offset: circumference * (1.0 - progress / 100.0),
        }
    }
}

pub fn render_progress_ring(progress: f64, config: RingConfig) -> String {
    let geometry = RingGeometry::new(progress, config);
    let center = config.size / 2.0;
    format!(
        r#"<div class="ring" style="width: {size}px; height: {size}px">
  <svg width="{size}" height="{size}" class="ring-svg" data-circumference="{circ:.3}">
    <circle class="ring-track" cx="{center}" cy="{center}" r="{radius}" fill="none" stroke-width="{stroke}" />
    <circle class="ring-fill" id="ring-fill" cx="{center}" cy="{center}" r="{radius}" fill="none" stroke-width="{stroke}" stroke-linecap="round" stroke-dasharray="{circ:.3}" stroke-dashoffset="{offset:.3}" />
  </svg>
  <div class="ring-label">
    <span class="ring-value" id="ring-value">{rounded}%</span>
    <span class="ring-caption">complete</span>
  </div>
</div>"#,
        size = config.size,
        center = center,
        radius = geometry.radius,
        stroke = config.stroke_width,
        circ = geometry.circumference,
        offset = geometry.dash_offset,
        rounded = progress.round() as i64,
    )
}

/// Form target that toggles `id` within `session`.
pub fn toggle_action(session: &str, id: &str) -> String {
    format!(
        "/routines/{}/toggle?session={}",
        urlencoding::encode(id),
        urlencoding::encode(session)
    )
}

pub fn render_routine_item(routine: &Routine, delay: u32, animating: bool, session: &str) -> String {
    let id = escape_html(&routine.id);
    let action = escape_html(&toggle_action(session, &routine.id));
    let row_class = class_names(&[("routine", true), ("completed", routine.completed)]);
    let check_class = class_names(&[
        ("check", true),
        ("checked", routine.completed),
        ("animate-check", animating),
    ]);
    let description = routine
        .description
        .as_deref()
        .map(|text| format!(r#"<span class="routine-desc">{}</span>"#, escape_html(text)))
        .unwrap_or_default();

    format!(
        r#"<form class="routine-form" method="post" action="{action}">
  <button type="submit" class="{row_class}" data-routine-id="{id}" style="animation-delay: {delay:.2}s">
    <span class="{check_class}"><svg viewBox="0 0 24 24" aria-hidden="true"><path d="M5 12l5 5L20 7" /></svg></span>
    <span class="routine-content"><span class="routine-title">{title}</span>{description}</span>
  </button>
</form>"#,
        delay = f64::from(delay) * 0.05,
        title = escape_html(&routine.title),
    )
}

/// Renders one category block. `tag` must name a known category.
pub fn render_routine_section(
    title: &str,
    tag: &str,
    routines: &[Routine],
    base_delay: u32,
    session: &str,
    is_animating: impl Fn(&str) -> bool,
) -> Result<String, RoutineError> {
    let category: Category = tag.parse()?;
    let progress = Progress::of(routines);

    let items = routines
        .iter()
        .enumerate()
        .map(|(index, routine)| {
            let delay = base_delay + index as u32 + 1;
            render_routine_item(routine, delay, is_animating(&routine.id), session)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        r#"<section class="section" data-category="{tag}" style="animation-delay: {delay:.1}s">
  <div class="section-header">
    <span class="section-icon {color}">{icon}</span>
    <h2>{title}</h2>
    <span class="section-count" id="count-{tag}">{completed}/{total}</span>
  </div>
  <div class="card">
{items}
  </div>
</section>"#,
        tag = category.as_str(),
        delay = f64::from(base_delay) * 0.1,
        color = category.color_class(),
        icon = category.icon(),
        title = escape_html(title),
        completed = progress.completed,
        total = progress.total,
    ))
}

pub struct IndexView<'a> {
    pub session: &'a str,
    pub header: &'a DateHeader,
    pub routines: &'a RoutineCollection,
    pub last_check_in: Option<&'a str>,
}

pub fn render_index(
    view: &IndexView<'_>,
    is_animating: impl Fn(&str) -> bool,
) -> Result<String, RoutineError> {
    let progress = view.routines.progress();
    let ring = render_progress_ring(
        progress.percentage().unwrap_or(0.0),
        RingConfig {
            size: 140.0,
            stroke_width: 10.0,
        },
    );

    let mut sections = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        sections.push(render_routine_section(
            category.title(),
            category.as_str(),
            view.routines.get(category),
            category.base_delay(),
            view.session,
            &is_animating,
        )?);
    }

    let check_in = view
        .last_check_in
        .map(|when| format!("Last check-in {}", escape_html(when)))
        .unwrap_or_default();

    let session = escape_html(view.session);
    let reset_action = escape_html(&format!("/reset?session={}", urlencoding::encode(view.session)));

    Ok(INDEX_HTML
        .replace("{{SESSION}}", &session)
        .replace("{{RESET_ACTION}}", &reset_action)
        .replace("{{WEEKDAY}}", &escape_html(&view.header.weekday))
        .replace("{{LONG_DATE}}", &escape_html(&view.header.long_date))
        .replace("{{RING}}", &ring)
        .replace("{{REMAINING}}", &remaining_message(&progress))
        .replace("{{CHECK_IN}}", &check_in)
        .replace("{{SECTIONS}}", &sections.join("\n")))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Routine</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg: #faf7f2;
      --ink: #2b2a28;
      --muted: #8b857d;
      --primary: #2f8f6b;
      --accent: #f2a541;
      --secondary: #ebe5dc;
      --card: #ffffff;
      --border: rgba(47, 72, 88, 0.08);
      --shadow: 0 12px 32px rgba(47, 72, 88, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .app {
      max-width: 32rem;
      margin: 0 auto;
      padding: 32px 16px 96px;
      display: grid;
      gap: 32px;
    }

    header {
      text-align: center;
      animation: rise 500ms ease both;
    }

    .weekday {
      margin: 0 0 4px;
      font-size: 0.85rem;
      font-weight: 500;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: 1.9rem;
      margin: 0;
    }

    .progress {
      display: flex;
      flex-direction: column;
      align-items: center;
      gap: 14px;
      animation: rise 500ms ease 100ms both;
    }

    .ring {
      position: relative;
      display: inline-flex;
      align-items: center;
      justify-content: center;
    }

    .ring-svg {
      transform: rotate(-90deg);
    }

    .ring-track {
      stroke: var(--secondary);
    }

    .ring-fill {
      stroke: var(--primary);
      transition: stroke-dashoffset 500ms ease-out;
    }

    .ring-label {
      position: absolute;
      inset: 0;
      display: flex;
      flex-direction: column;
      align-items: center;
      justify-content: center;
    }

    .ring-value {
      font-family: "Fraunces", "Georgia", serif;
      font-size: 1.9rem;
      font-weight: 600;
    }

    .ring-caption,
    .remaining,
    .check-in {
      font-size: 0.8rem;
      color: var(--muted);
    }

    .remaining::before {
      content: "\2728  ";
    }

    .sections {
      display: grid;
      gap: 32px;
    }

    .section {
      animation: rise 500ms ease both;
    }

    .section-header {
      display: flex;
      align-items: center;
      gap: 12px;
      margin-bottom: 12px;
      padding: 0 8px;
    }

    .section-header h2 {
      margin: 0;
      font-size: 1.05rem;
      font-weight: 500;
    }

    .section-count {
      margin-left: auto;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .text-accent { color: var(--accent); }
    .text-primary { color: var(--primary); }
    .text-muted { color: var(--muted); }

    .card {
      background: var(--card);
      border-radius: 18px;
      border: 1px solid var(--border);
      box-shadow: var(--shadow);
      overflow: hidden;
    }

    .routine-form {
      margin: 0;
    }

    .routine-form + .routine-form {
      border-top: 1px solid var(--border);
    }

    .routine {
      appearance: none;
      width: 100%;
      border: none;
      background: transparent;
      font: inherit;
      color: inherit;
      text-align: left;
      display: flex;
      align-items: center;
      gap: 16px;
      padding: 16px;
      cursor: pointer;
      transition: background 300ms ease, transform 150ms ease, opacity 300ms ease;
      animation: rise 400ms ease both;
    }

    .routine:hover {
      background: rgba(235, 229, 220, 0.5);
    }

    .routine:active {
      transform: scale(0.98);
    }

    .routine.completed {
      opacity: 0.75;
    }

    .routine.completed .routine-title {
      text-decoration: line-through;
      color: var(--muted);
    }

    .check {
      flex: none;
      width: 24px;
      height: 24px;
      border-radius: 999px;
      border: 2px solid rgba(139, 133, 125, 0.3);
      display: flex;
      align-items: center;
      justify-content: center;
      transition: all 300ms ease;
    }

    .check svg {
      width: 14px;
      height: 14px;
      fill: none;
      stroke: white;
      stroke-width: 3;
      opacity: 0;
      transform: scale(0.5);
      transition: all 200ms ease;
    }

    .check.checked {
      background: var(--primary);
      border-color: var(--primary);
    }

    .check.checked svg {
      opacity: 1;
      transform: scale(1);
    }

    .check.animate-check {
      animation: pop 300ms ease;
    }

    .routine-content {
      display: flex;
      flex-direction: column;
      min-width: 0;
    }

    .routine-title {
      font-weight: 500;
    }

    .routine-desc {
      margin-top: 2px;
      font-size: 0.85rem;
      color: var(--muted);
      white-space: nowrap;
      overflow: hidden;
      text-overflow: ellipsis;
    }

    .reset-form {
      text-align: center;
    }

    .reset {
      appearance: none;
      border: 1px solid var(--border);
      background: transparent;
      border-radius: 999px;
      padding: 8px 16px;
      font: inherit;
      font-size: 0.85rem;
      color: var(--muted);
      cursor: pointer;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(12px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @keyframes pop {
      0% { transform: scale(1); }
      50% { transform: scale(1.2); }
      100% { transform: scale(1); }
    }
  </style>
</head>
<body>
  <main class="app" data-session="{{SESSION}}">
    <header>
      <p class="weekday" id="weekday">{{WEEKDAY}}</p>
      <h1 id="long-date">{{LONG_DATE}}</h1>
    </header>

    <section class="progress">
      {{RING}}
      <span class="remaining" id="remaining">{{REMAINING}}</span>
      <span class="check-in" id="check-in">{{CHECK_IN}}</span>
    </section>

    <div class="sections">
{{SECTIONS}}
    </div>

    <form class="reset-form" id="reset-form" method="post" action="{{RESET_ACTION}}">
      <button class="reset" type="submit">Start over</button>
    </form>
  </main>

  <script>
    const CHECK_ANIMATION_MS = 300;
    const session = document.querySelector('main').dataset.session;
    const rows = new Map(
      Array.from(document.querySelectorAll('.routine')).map((row) => [row.dataset.routineId, row])
    );
    const ringSvg = document.querySelector('.ring-svg');
    const ringFill = document.getElementById('ring-fill');
    const ringValue = document.getElementById('ring-value');
    const remainingEl = document.getElementById('remaining');
    const checkInEl = document.getElementById('check-in');
    const circumference = Number(ringSvg.dataset.circumference);

    const applySnapshot = (snapshot) => {
      const progress = snapshot.percentage ?? 0;
      ringFill.setAttribute('stroke-dashoffset', (circumference * (1 - progress / 100)).toFixed(3));
      ringValue.textContent = `${Math.round(progress)}%`;
      remainingEl.textContent = snapshot.remaining_message;
      checkInEl.textContent = snapshot.last_check_in ? `Last check-in ${snapshot.last_check_in}` : '';

      snapshot.sections.forEach((section) => {
        document.getElementById(`count-${section.category}`).textContent = `${section.completed}/${section.total}`;
        section.routines.forEach((routine) => {
          const row = rows.get(routine.id);
          if (!row) {
            return;
          }
          row.classList.toggle('completed', routine.completed);
          row.querySelector('.check').classList.toggle('checked', routine.completed);
        });
      });
    };

    const post = async (path, body) => {
      const res = await fetch(`${path}?session=${encodeURIComponent(session)}`, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    document.querySelectorAll('.routine-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const row = form.querySelector('.routine');
        const check = row.querySelector('.check');
        check.classList.add('animate-check');
        setTimeout(() => check.classList.remove('animate-check'), CHECK_ANIMATION_MS);
        post('/api/toggle', { id: row.dataset.routineId })
          .then(applySnapshot)
          .catch((err) => console.error(err));
      });
    });

    document.getElementById('reset-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/reset').then(applySnapshot).catch((err) => console.error(err));
    });
  </script>
</body>
</html>
"#;
