use super::{escape, layout, percent, timestamp};
use crate::services::gauge::{CanisterSummary, DashboardView};
use axum::response::Html;

fn card(summary: &CanisterSummary) -> String {
    let canister = &summary.canister;
    let type_name = summary
        .canister_type
        .as_ref()
        .map(|t| escape(&t.name))
        .unwrap_or_else(|| "Unknown type".to_string());
    let reading = match (summary.remaining_percentage, &summary.latest_weighing) {
        (Some(pct), Some(latest)) => format!(
            r#"<div class="gauge"><div class="fill {class}" style="width: {width:.1}%"></div></div>
<p class="reading">{pct} left · {weight}g on {when}</p>"#,
            class = summary.status_class,
            width = pct,
            pct = percent(pct),
            weight = latest.weight,
            when = timestamp(&latest.recorded_at),
        ),
        _ => r#"<p class="reading muted">No weighings yet</p>"#.to_string(),
    };
    let badge = if summary.is_depleted {
        r#" <span class="badge depleted">depleted</span>"#
    } else {
        ""
    };

    format!(
        r#"<li class="card {class}">
  <a href="/canister/{id}"><strong>{label}</strong></a>{badge}
  <p class="muted">{type_name} · {id}</p>
  {reading}
</li>"#,
        class = summary.status_class,
        id = escape(&canister.id),
        label = escape(&canister.label),
        badge = badge,
        type_name = type_name,
        reading = reading,
    )
}

pub fn dashboard_page(view: &DashboardView) -> Html<String> {
    let cards = if view.canisters.is_empty() {
        r#"<p class="muted">No canisters yet. Add one below.</p>"#.to_string()
    } else {
        let items: Vec<String> = view.canisters.iter().map(card).collect();
        format!(r#"<ul class="cards">{}</ul>"#, items.join("\n"))
    };

    let options: Vec<String> = view
        .canister_types
        .iter()
        .map(|t| format!(r#"<option value="{}">{}</option>"#, t.id, escape(&t.name)))
        .collect();

    let body = format!(
        r#"<h1>Canisters</h1>
{cards}
<section class="panel">
  <h2>New canister</h2>
  <form method="post" action="/canister/create">
    <label>Label <input name="label" value="{suggested}" maxlength="64" required></label>
    <label>Type <select name="canister_type_id" required>{options}</select></label>
    <button type="submit">Add canister</button>
  </form>
</section>"#,
        cards = cards,
        suggested = escape(&view.suggested_label),
        options = options.join(""),
    );
    layout("Canisters", &body)
}
