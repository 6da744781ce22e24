//! Statement text for the MySQL writer. Values are always bound as
//! positional parameters; only identifiers are interpolated.

pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT INTO t (a, b) VALUES (?, ?), (?, ?)` for `rows` rows.
pub fn insert_statement(table: &str, columns: &[&str], rows: usize) -> String {
    let tuple = format!("({})", vec!["?"; columns.len()].join(", "));
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table),
        column_list(columns),
        vec![tuple; rows].join(", ")
    )
}

/// Conflict clause for upserts. With nothing to replace the row is kept as
/// is by assigning `noop` to itself.
pub fn upsert_clause(replace: &[&str], noop: &str) -> String {
    let assignments = if replace.is_empty() {
        let col = quote_ident(noop);
        format!("{col} = {col}")
    } else {
        replace
            .iter()
            .map(|c| {
                let col = quote_ident(c);
                format!("{col} = VALUES({col})")
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(" ON DUPLICATE KEY UPDATE {assignments}")
}

/// `UPDATE t SET a = ?, b = ? WHERE f = ? AND g = ?`. Parameters bind the SET
/// columns first, then the filter columns, each in declaration order.
pub fn update_statement(table: &str, set: &[&str], filter: &[&str]) -> String {
    let assign = |cols: &[&str], sep: &str| {
        cols.iter()
            .map(|c| format!("{} = ?", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(sep)
    };
    format!(
        "UPDATE {} SET {} WHERE {}",
        quote_ident(table),
        assign(set, ", "),
        assign(filter, " AND ")
    )
}
