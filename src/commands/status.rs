use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    let reference_accounts =
        query_count(&connection, "SELECT COUNT(*) FROM conta_analiticas").unwrap_or(0);
    let tax_classifications =
        query_count(&connection, "SELECT COUNT(*) FROM classificacao_tributarias").unwrap_or(0);
    let client_accounts =
        query_count(&connection, "SELECT COUNT(*) FROM conta_clientes").unwrap_or(0);
    let processed_files = query_count(
        &connection,
        "SELECT COUNT(DISTINCT arquivo_id) FROM conta_clientes WHERE arquivo_id IS NOT NULL",
    )
    .unwrap_or(0);

    info!(
        path = %args.db_path.display(),
        reference_accounts,
        tax_classifications,
        client_accounts,
        processed_files,
        "database status"
    );

    Ok(())
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
