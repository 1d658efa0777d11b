use super::{escape, layout, percent, timestamp};
use crate::services::gauge::{CanisterDetail, WeighingReading};
use axum::response::Html;

fn history_row(row: &WeighingReading) -> String {
    let since = percent(row.consumed_since_previous);
    format!(
        r#"<tr>
  <td>{when}</td><td>{weight}g</td><td>{gas}g</td><td>{remaining}</td><td>{consumed}</td><td>{since}</td>
  <td>{comment}</td>
  <td><form method="post" action="/weighing/{id}/delete"><button class="link danger">Delete</button></form></td>
</tr>"#,
        when = timestamp(&row.weighing.recorded_at),
        weight = row.weighing.weight,
        gas = row.reading.remaining_gas,
        remaining = percent(row.reading.remaining_percentage),
        consumed = percent(row.reading.consumption_percentage),
        since = since,
        comment = escape(row.weighing.comment.as_deref().unwrap_or("")),
        id = row.weighing.id,
    )
}

pub fn detail_page(detail: &CanisterDetail) -> Html<String> {
    let canister = &detail.canister;
    let id = escape(&canister.id);

    let summary = match &detail.latest_weighing {
        Some(latest) => format!(
            r#"<div class="gauge large"><div class="fill {class}" style="width: {width:.1}%"></div></div>
<p class="reading">{pct} remaining ({gas}g of {capacity}g)</p>"#,
            class = detail.status_class,
            width = latest.reading.remaining_percentage,
            pct = percent(latest.reading.remaining_percentage),
            gas = latest.reading.remaining_gas,
            capacity = detail.gas_capacity,
        ),
        None => r#"<p class="reading muted">No weighings yet</p>"#.to_string(),
    };

    let status_action = if detail.is_depleted {
        format!(
            r#"<form method="post" action="/canister/{id}/reactivate"><button>Reactivate</button></form>"#
        )
    } else {
        format!(
            r#"<form method="post" action="/canister/{id}/mark-depleted"><button>Mark depleted</button></form>"#
        )
    };

    let history = if detail.weighings.is_empty() {
        String::new()
    } else {
        let rows: Vec<String> = detail.weighings.iter().map(history_row).collect();
        format!(
            r#"<section class="panel">
  <h2>History</h2>
  <canvas id="history-chart" data-canister-id="{id}" width="720" height="240"></canvas>
  <table>
    <thead><tr><th>Recorded</th><th>Weight</th><th>Gas</th><th>Remaining</th><th>Used</th><th>Since previous</th><th>Comment</th><th></th></tr></thead>
    <tbody>{rows}</tbody>
  </table>
</section>"#,
            rows = rows.join("\n"),
        )
    };

    let body = format!(
        r#"<h1>{label} <span class="badge {class}">{status}</span></h1>
<p class="muted">{id} · {type_name} (full {full}g, empty {empty}g) ·
  <button class="link" data-cheatsheet="{type_id}">Cheat sheet</button></p>
{summary}
<section class="panel">
  <h2>Add weighing</h2>
  <form method="post" action="/canister/{id}/add-weighing">
    <label>Weight (g) <input type="number" name="weight" min="1" required></label>
    <label>Recorded at <input type="datetime-local" name="recorded_at"></label>
    <label>Comment <input name="comment"></label>
    <button type="submit">Save</button>
  </form>
</section>
{history}
<section class="panel actions">
  <form method="post" action="/canister/{id}/update-label">
    <label>Label <input name="label" value="{label}" maxlength="64" required></label>
    <button type="submit">Rename</button>
  </form>
  {status_action}
  <form method="post" action="/canister/{id}/delete" data-confirm="Delete this canister and all of its weighings?">
    <button class="danger">Delete canister</button>
  </form>
</section>"#,
        label = escape(&canister.label),
        class = detail.status_class,
        status = canister.status.as_str(),
        id = id,
        type_name = escape(&detail.canister_type.name),
        full = detail.canister_type.full_weight,
        empty = detail.canister_type.empty_weight,
        type_id = detail.canister_type.id,
        summary = summary,
        history = history,
        status_action = status_action,
    );
    layout(&canister.label, &body)
}
