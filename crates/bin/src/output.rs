//! Output formatting for human-readable and JSON output.

use userbase::User;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }
}

const USER_HEADERS: [&str; 6] = ["ID", "USERNAME", "EMAIL", "ROLE", "ACTIVE", "VERIFIED"];

/// One table row per user, in `USER_HEADERS` order.
pub fn user_rows<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<Vec<String>> {
    users
        .into_iter()
        .map(|user| {
            vec![
                user.id.clone().unwrap_or_else(|| "-".to_string()),
                user.username.clone(),
                user.email.clone(),
                user.role.clone().unwrap_or_else(|| "-".to_string()),
                yes_no(user.active).to_string(),
                yes_no(user.verified).to_string(),
            ]
        })
        .collect()
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Print users as an aligned table, or a note when there are none.
pub fn print_users<'a>(users: impl IntoIterator<Item = &'a User>) {
    let rows = user_rows(users);
    if rows.is_empty() {
        println!("No users");
        return;
    }
    print!("{}", render_table(&USER_HEADERS, &rows));
}

/// Render `rows` under `headers` with columns padded to the widest cell.
///
/// Cells beyond the header count are ignored.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = render_line(headers.iter().copied(), &widths);
    for row in rows {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let mut line = padded.join("  ").trim_end().to_string();
    line.push('\n');
    line
}
