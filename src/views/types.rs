use super::{escape, layout};
use crate::calculations::gas_capacity;
use crate::entities::canister_type;
use crate::repositories::canister_type_repository::is_protected;
use axum::response::Html;

pub fn types_page(types: &[canister_type::Model]) -> Html<String> {
    let rows: Vec<String> = types
        .iter()
        .map(|t| {
            let delete = if is_protected(&t.name) {
                r#"<span class="muted">built-in</span>"#.to_string()
            } else {
                format!(
                    r#"<form method="post" action="/types/{}/delete"><button class="link danger">Delete</button></form>"#,
                    t.id
                )
            };
            format!(
                r#"<tr><td>{name}</td><td>{full}g</td><td>{empty}g</td><td>{capacity}g</td>
<td><button class="link" data-cheatsheet="{id}">Cheat sheet</button></td><td>{delete}</td></tr>"#,
                name = escape(&t.name),
                full = t.full_weight,
                empty = t.empty_weight,
                capacity = gas_capacity(t.full_weight, t.empty_weight),
                id = t.id,
                delete = delete,
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Canister types</h1>
<table>
  <thead><tr><th>Name</th><th>Full</th><th>Empty</th><th>Capacity</th><th></th><th></th></tr></thead>
  <tbody>{rows}</tbody>
</table>
<section class="panel">
  <h2>New type</h2>
  <form method="post" action="/types/create">
    <label>Name <input name="name" maxlength="100" required></label>
    <label>Full weight (g) <input type="number" name="full_weight" min="1" required></label>
    <label>Empty weight (g) <input type="number" name="empty_weight" min="1" required></label>
    <button type="submit">Add type</button>
  </form>
</section>"#,
        rows = rows.join("\n"),
    );
    layout("Canister types", &body)
}
