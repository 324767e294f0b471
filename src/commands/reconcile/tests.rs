use chrono::NaiveDate;
use rusqlite::Connection;

use crate::model::{AccountRecord, ExtractPayload, ReferenceAccount, ReportHeader};

use super::db::{ensure_schema, fetch_reference_accounts, insert_client_accounts};
use super::matching::{build_reconciled, filter_revenue_expense, match_against_reference};
use super::money::parse_centavos;
use super::ordering::{classification_sort_key, sort_accounts};
use super::period::extract_period_bounds;
use super::pipeline::reconcile_payload;

fn record(classification: Option<&str>, account: Option<&str>) -> AccountRecord {
    AccountRecord {
        classification: classification.map(str::to_string),
        account: account.map(str::to_string),
        ..Default::default()
    }
}

fn reference(id: i64, descricao: &str) -> ReferenceAccount {
    ReferenceAccount {
        id,
        descricao: descricao.to_string(),
        aliquota_cbs: Some(8.7),
        aliquota_ibs: Some(17.7),
        classificacao_tributaria_id: Some(3),
        tipo: Some("tributada".to_string()),
    }
}

#[test]
fn parse_centavos_converts_brazilian_monetary_text() {
    assert_eq!(parse_centavos(Some("0,00")), 0);
    assert_eq!(parse_centavos(Some("1.234,56")), 123456);
    assert_eq!(parse_centavos(Some("889,70")), 88970);
    assert_eq!(parse_centavos(Some("21.209.514,46")), 2120951446);
}

#[test]
fn parse_centavos_defaults_malformed_input_to_zero() {
    assert_eq!(parse_centavos(None), 0);
    assert_eq!(parse_centavos(Some("")), 0);
    assert_eq!(parse_centavos(Some("abc")), 0);
    assert_eq!(parse_centavos(Some("1.234,56D")), 0);
}

#[test]
fn classification_sort_key_parses_segments_numerically() {
    assert_eq!(classification_sort_key(Some("3.1.01.01")), vec![3, 1, 1, 1]);
    assert_eq!(classification_sort_key(Some("1")), vec![1]);
    assert_eq!(
        classification_sort_key(Some("1.1.01.010.002")),
        vec![1, 1, 1, 10, 2]
    );
    assert_eq!(classification_sort_key(None), vec![0]);
    assert_eq!(classification_sort_key(Some("")), vec![0]);
    assert_eq!(classification_sort_key(Some("3.x")), vec![0]);
}

#[test]
fn sort_accounts_orders_numerically_with_missing_codes_first() {
    let records = vec![
        record(Some("10"), Some("C")),
        record(Some("2"), Some("B")),
        record(None, Some("A")),
    ];
    let buckets = match_against_reference(&records.iter().collect::<Vec<_>>(), &[]);
    let mut accounts = build_reconciled(&buckets, &[]);

    sort_accounts(&mut accounts, false);

    let order: Vec<Option<&str>> = accounts
        .iter()
        .map(|account| account.classification.as_deref())
        .collect();
    assert_eq!(order, vec![None, Some("2"), Some("10")]);
}

#[test]
fn strict_ordering_disambiguates_zero_padding_variants() {
    let records = vec![
        record(Some("3.1.1"), Some("B")),
        record(Some("3.1.01"), Some("A")),
    ];
    let buckets = match_against_reference(&records.iter().collect::<Vec<_>>(), &[]);
    let mut accounts = build_reconciled(&buckets, &[]);

    sort_accounts(&mut accounts, true);
    assert_eq!(accounts[0].classification.as_deref(), Some("3.1.01"));
    assert_eq!(accounts[1].classification.as_deref(), Some("3.1.1"));
}

#[test]
fn extract_period_bounds_reads_ranges_and_single_dates() {
    let range = extract_period_bounds(Some("01/01/2025 - 30/06/2025"));
    assert_eq!(
        range.data_inicial,
        NaiveDate::from_ymd_opt(2025, 1, 1)
    );
    assert_eq!(range.data_final, NaiveDate::from_ymd_opt(2025, 6, 30));
    assert_eq!(range.ano_base, Some(2025));

    let single = extract_period_bounds(Some("Competência: 27/10/2025"));
    assert_eq!(single.data_inicial, NaiveDate::from_ymd_opt(2025, 10, 27));
    assert_eq!(single.data_final, NaiveDate::from_ymd_opt(2025, 10, 27));
    assert_eq!(single.ano_base, Some(2025));

    let empty = extract_period_bounds(Some(""));
    assert_eq!(empty.data_inicial, None);
    assert_eq!(empty.data_final, None);
    assert_eq!(empty.ano_base, None);

    let missing = extract_period_bounds(None);
    assert_eq!(missing.ano_base, None);
}

#[test]
fn filter_revenue_expense_keeps_only_result_roots() {
    let records = vec![
        record(Some("1.1"), Some("CAIXA")),
        record(Some("3.1"), Some("RECEITAS")),
        record(Some("4.2"), Some("DESPESAS ADMINISTRATIVAS")),
        record(None, Some("SEM CLASSIFICACAO")),
    ];

    let in_scope = filter_revenue_expense(&records);
    let names: Vec<&str> = in_scope
        .iter()
        .filter_map(|item| item.account.as_deref())
        .collect();
    assert_eq!(names, vec!["RECEITAS", "DESPESAS ADMINISTRATIVAS"]);
}

#[test]
fn match_against_reference_deduplicates_each_bucket_by_name() {
    let records = vec![
        record(Some("3.1"), Some("RECEITAS")),
        record(Some("3.2"), Some("RECEITAS")),
        record(Some("4.1"), Some("DESCONHECIDA")),
        record(Some("4.2"), Some("DESCONHECIDA")),
        record(Some("4.3"), None),
    ];
    let reference_set = vec![reference(10, "RECEITAS")];

    let refs: Vec<&AccountRecord> = records.iter().collect();
    let buckets = match_against_reference(&refs, &reference_set);

    assert_eq!(buckets.approved.len(), 1);
    assert_eq!(buckets.approved[0].classification.as_deref(), Some("3.1"));
    assert_eq!(buckets.rejected.len(), 1);
    assert_eq!(buckets.rejected[0].classification.as_deref(), Some("4.1"));
}

#[test]
fn build_reconciled_enriches_approved_and_nulls_rejected() {
    let records = vec![
        record(Some("3.1"), Some("RECEITAS")),
        record(Some("4.1"), Some("DESCONHECIDA")),
    ];
    let reference_set = vec![reference(42, "RECEITAS")];

    let refs: Vec<&AccountRecord> = records.iter().collect();
    let buckets = match_against_reference(&refs, &reference_set);
    let accounts = build_reconciled(&buckets, &reference_set);

    let approved = &accounts[0];
    assert!(approved.is_approved);
    assert_eq!(approved.aliquota_cbs, Some(8.7));
    assert_eq!(approved.aliquota_ibs, Some(17.7));
    assert_eq!(approved.classificacao_tributaria_id, Some(3));
    assert_eq!(approved.id_conta_cenario_base_rumo, Some(42));

    let rejected = &accounts[1];
    assert!(!rejected.is_approved);
    assert_eq!(rejected.aliquota_cbs, None);
    assert_eq!(rejected.id_conta_cenario_base_rumo, None);
}

#[test]
fn reconcile_payload_orders_stamps_and_numbers_accounts() {
    let mut revenue = record(Some("3.1"), Some("RECEITAS"));
    revenue.previous_balance = Some("1.000,00".to_string());
    revenue.current_balance = Some("1.500,50".to_string());

    let payload = ExtractPayload {
        header: ReportHeader {
            period: Some("01/01/2025 - 30/06/2025".to_string()),
            ..Default::default()
        },
        data: vec![
            record(Some("4.2"), Some("DESPESAS ADMINISTRATIVAS")),
            revenue,
            record(Some("1.1"), Some("CAIXA")),
        ],
    };
    let reference_set = vec![reference(7, "RECEITAS")];

    let outcome = reconcile_payload(&payload, &reference_set, Some(99), false);

    assert_eq!(outcome.in_scope, 2);
    assert_eq!(outcome.approved, 1);
    assert_eq!(outcome.rejected, 1);
    assert_eq!(outcome.accounts.len(), 2);

    // Numeric hierarchy: 3.1 before 4.2, regardless of input order.
    assert_eq!(outcome.accounts[0].classification.as_deref(), Some("3.1"));
    assert_eq!(outcome.accounts[0].ordem, Some(1));
    assert_eq!(outcome.accounts[0].saldo_anterior, 100000);
    assert_eq!(outcome.accounts[0].saldo_atual, 150050);
    assert_eq!(outcome.accounts[1].ordem, Some(2));

    for account in &outcome.accounts {
        assert_eq!(account.data_inicial, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(account.data_final, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(account.ano_base, Some(2025));
        assert_eq!(account.arquivo_id, Some(99));
    }
}

#[test]
fn reconcile_payload_rejects_everything_without_reference_accounts() {
    let payload = ExtractPayload {
        header: ReportHeader::default(),
        data: vec![
            record(Some("3.1"), Some("RECEITAS")),
            record(Some("4.1"), Some("DESPESAS")),
        ],
    };

    let outcome = reconcile_payload(&payload, &[], None, false);
    assert_eq!(outcome.approved, 0);
    assert_eq!(outcome.rejected, 2);
    assert!(outcome.accounts.iter().all(|account| !account.is_approved));
}

#[test]
fn classification_deserializes_from_scalar_or_single_element_list() {
    let scalar: AccountRecord =
        serde_json::from_str(r#"{"classification": "3.1"}"#).expect("scalar form parses");
    assert_eq!(scalar.classification.as_deref(), Some("3.1"));

    let list: AccountRecord = serde_json::from_str(r#"{"classification": ["3.1.01"]}"#)
        .expect("list form parses");
    assert_eq!(list.classification.as_deref(), Some("3.1.01"));

    let empty_list: AccountRecord =
        serde_json::from_str(r#"{"classification": []}"#).expect("empty list parses");
    assert_eq!(empty_list.classification, None);

    let missing: AccountRecord = serde_json::from_str("{}").expect("empty object parses");
    assert_eq!(missing.classification, None);
}

#[test]
fn stored_payload_with_list_classifications_reconciles() {
    let raw = r#"{
        "success": true,
        "data": {
            "header": {"period": "01/01/2025 - 30/06/2025"},
            "data": [
                {"classification": ["3.1"], "account": "RECEITAS",
                 "current_balance": "1.500,50"},
                {"classification": "1.1", "account": "CAIXA"}
            ]
        }
    }"#;

    let envelope: crate::model::ExtractEnvelope =
        serde_json::from_str(raw).expect("envelope parses");
    let payload = envelope.data.expect("success payload");
    assert_eq!(payload.data[0].classification.as_deref(), Some("3.1"));

    let outcome = reconcile_payload(&payload, &[reference(7, "RECEITAS")], None, false);
    assert_eq!(outcome.in_scope, 1);
    assert_eq!(outcome.approved, 1);
    assert_eq!(outcome.accounts[0].saldo_atual, 150050);
    assert_eq!(
        outcome.accounts[0].ano_base,
        Some(2025)
    );
}

#[test]
fn reference_accounts_round_trip_through_the_store() {
    let connection = Connection::open_in_memory().expect("in-memory database opens");
    ensure_schema(&connection).expect("schema applies");

    connection
        .execute_batch(
            "
            INSERT INTO classificacao_tributarias (id, tipo) VALUES (3, 'tributada');
            INSERT INTO conta_analiticas (id, descricao, aliquota_cbs, aliquota_ibs, classificacao_tributaria_id)
            VALUES (42, 'RECEITAS', 8.7, 17.7, 3);
            INSERT INTO conta_analiticas (id, descricao, aliquota_cbs, aliquota_ibs, classificacao_tributaria_id)
            VALUES (43, 'OUTRAS RECEITAS', NULL, NULL, NULL);
            ",
        )
        .expect("fixture rows insert");

    let accounts = fetch_reference_accounts(&connection).expect("reference accounts load");
    assert_eq!(accounts.len(), 2);

    let enriched = accounts
        .iter()
        .find(|account| account.descricao == "RECEITAS")
        .expect("joined row present");
    assert_eq!(enriched.id, 42);
    assert_eq!(enriched.tipo.as_deref(), Some("tributada"));

    let bare = accounts
        .iter()
        .find(|account| account.descricao == "OUTRAS RECEITAS")
        .expect("unjoined row present");
    assert_eq!(bare.tipo, None);
}

#[test]
fn insert_client_accounts_writes_one_ordered_batch() {
    let mut connection = Connection::open_in_memory().expect("in-memory database opens");
    ensure_schema(&connection).expect("schema applies");

    let records = vec![
        record(Some("3.1"), Some("RECEITAS")),
        record(Some("4.1"), Some("DESPESAS")),
    ];
    let refs: Vec<&AccountRecord> = records.iter().collect();
    let buckets = match_against_reference(&refs, &[]);
    let mut accounts = build_reconciled(&buckets, &[]);
    for account in &mut accounts {
        account.data_inicial = NaiveDate::from_ymd_opt(2025, 1, 1);
        account.data_final = NaiveDate::from_ymd_opt(2025, 6, 30);
        account.ano_base = Some(2025);
        account.arquivo_id = Some(7);
    }

    let written =
        insert_client_accounts(&mut connection, &accounts).expect("bulk insert succeeds");
    assert_eq!(written, 2);

    let stored: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM conta_clientes WHERE arquivo_id = 7",
            [],
            |row| row.get(0),
        )
        .expect("count query runs");
    assert_eq!(stored, 2);

    let first_ordem: i64 = connection
        .query_row(
            "SELECT ordem FROM conta_clientes WHERE grau_detalhamento = '3.1'",
            [],
            |row| row.get(0),
        )
        .expect("ordem query runs");
    assert_eq!(first_ordem, 1);
}
