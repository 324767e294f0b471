use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::Null;
use rusqlite::{Connection, params};

use crate::model::{ReconciledAccount, ReferenceAccount};

pub(super) fn open_database(path: &Path) -> Result<Connection> {
    let connection = Connection::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub(super) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS classificacao_tributarias (
          id INTEGER PRIMARY KEY,
          tipo TEXT
        );

        CREATE TABLE IF NOT EXISTS conta_analiticas (
          id INTEGER PRIMARY KEY,
          descricao TEXT NOT NULL,
          aliquota_cbs REAL,
          aliquota_ibs REAL,
          classificacao_tributaria_id INTEGER,
          FOREIGN KEY(classificacao_tributaria_id) REFERENCES classificacao_tributarias(id)
        );

        CREATE TABLE IF NOT EXISTS conta_clientes (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          ordem INTEGER,
          grau_detalhamento TEXT,
          descricao TEXT,
          natureza_conta TEXT,
          receita_despesa TEXT,
          data_inicial TEXT,
          data_final TEXT,
          saldo_anterior INTEGER,
          total_debito INTEGER,
          total_credito INTEGER,
          saldo_atual INTEGER,
          ano_base INTEGER,
          id_conta_cenario_base_rumo INTEGER,
          arquivo_id INTEGER,
          tipo INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_conta_analiticas_descricao ON conta_analiticas(descricao);
        CREATE INDEX IF NOT EXISTS idx_conta_clientes_arquivo ON conta_clientes(arquivo_id);
        ",
    )?;

    Ok(())
}

/// Reads the reference chart of accounts once per run. The snapshot is
/// immutable for the duration of the reconciliation.
pub(super) fn fetch_reference_accounts(connection: &Connection) -> Result<Vec<ReferenceAccount>> {
    let mut statement = connection.prepare(
        "
        SELECT conta_analiticas.id,
               conta_analiticas.descricao,
               conta_analiticas.aliquota_cbs,
               conta_analiticas.aliquota_ibs,
               conta_analiticas.classificacao_tributaria_id,
               classificacao_tributarias.tipo
        FROM conta_analiticas
        LEFT JOIN classificacao_tributarias
          ON conta_analiticas.classificacao_tributaria_id = classificacao_tributarias.id
        ",
    )?;

    let rows = statement.query_map([], |row| {
        Ok(ReferenceAccount {
            id: row.get(0)?,
            descricao: row.get(1)?,
            aliquota_cbs: row.get(2)?,
            aliquota_ibs: row.get(3)?,
            classificacao_tributaria_id: row.get(4)?,
            tipo: row.get(5)?,
        })
    })?;

    let accounts = rows
        .collect::<rusqlite::Result<Vec<ReferenceAccount>>>()
        .context("failed to read reference accounts")?;

    Ok(accounts)
}

/// Bulk write of the final ordered list: one prepared statement inside one
/// transaction, so a failure leaves no partial rows behind. Errors propagate
/// unchanged; there is no internal retry.
pub(super) fn insert_client_accounts(
    connection: &mut Connection,
    accounts: &[ReconciledAccount],
) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO conta_clientes (
              ordem, grau_detalhamento, descricao, natureza_conta, receita_despesa,
              data_inicial, data_final, saldo_anterior, total_debito, total_credito,
              saldo_atual, ano_base, id_conta_cenario_base_rumo, arquivo_id, tipo
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ",
        )?;

        for (index, account) in accounts.iter().enumerate() {
            statement.execute(params![
                (index + 1) as i64,
                account.classification,
                account.account,
                Null,
                Null,
                account.data_inicial,
                account.data_final,
                account.saldo_anterior,
                account.total_debito,
                account.total_credito,
                account.saldo_atual,
                account.ano_base,
                account.id_conta_cenario_base_rumo,
                account.arquivo_id,
                account.is_approved,
            ])?;
        }
    }

    tx.commit()?;
    Ok(accounts.len())
}
