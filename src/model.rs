use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One positioned text fragment from the document's text layer. `top` follows
/// the smaller-is-higher vertical convention of the extractor output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub left: f64,
    pub right: f64,
    pub top: f64,
}

impl Word {
    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentContent {
    pub pages: Vec<PageContent>,
}

/// Column-geometry constants for the one balancete template this engine
/// targets. Tuning parameters, not algorithm: a different template gets a
/// different profile file, not different code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutProfile {
    pub min_top: f64,
    pub row_tolerance: f64,
    pub code_right_max: f64,
    pub classification_center_max: f64,
    pub account_center_max: f64,
    pub account_left_min: f64,
    pub previous_balance_center_max: f64,
    pub debit_center_max: f64,
    pub credit_center_max: f64,
}

impl Default for LayoutProfile {
    fn default() -> Self {
        Self {
            min_top: 70.0,
            row_tolerance: 1.5,
            code_right_max: 30.0,
            classification_center_max: 120.0,
            account_center_max: 320.0,
            account_left_min: 95.0,
            previous_balance_center_max: 410.0,
            debit_center_max: 460.0,
            credit_center_max: 520.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportHeader {
    pub company: Option<String>,
    pub cnpj: Option<String>,
    pub report_type: Option<String>,
    pub period: Option<String>,
    pub issue_date: Option<String>,
    pub time: Option<String>,
    pub page: Option<String>,
    pub book_number: Option<String>,
}

/// One extracted table row. Monetary fields keep their raw Brazilian-format
/// text at this stage; conversion to centavos happens during reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRecord {
    pub code: Option<String>,
    #[serde(default, deserialize_with = "classification_scalar")]
    pub classification: Option<String>,
    pub account: Option<String>,
    pub previous_balance: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    pub current_balance: Option<String>,
    pub parent_category: Option<String>,
}

/// Some export variants emit the classification as a one-element list.
/// Normalize to a scalar here so nothing downstream has to branch on shape.
fn classification_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Scalar(String),
        List(Vec<String>),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(Raw::Scalar(value)) => Some(value),
        Some(Raw::List(values)) => values.into_iter().next(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractPayload {
    pub header: ReportHeader,
    pub data: Vec<AccountRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Document,
    NoData,
    Persistence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractFailure {
    pub category: ErrorCategory,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtractFailure>,
}

impl ExtractEnvelope {
    pub fn success(payload: ExtractPayload) -> Self {
        Self {
            success: true,
            data: Some(payload),
            error: None,
        }
    }

    pub fn failure(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ExtractFailure {
                category,
                message: message.into(),
            }),
        }
    }
}

/// One row of the reference chart of accounts, read once per run and treated
/// as an immutable snapshot.
#[derive(Debug, Clone)]
pub struct ReferenceAccount {
    pub id: i64,
    pub descricao: String,
    pub aliquota_cbs: Option<f64>,
    pub aliquota_ibs: Option<f64>,
    pub classificacao_tributaria_id: Option<i64>,
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciledAccount {
    pub code: Option<String>,
    pub classification: Option<String>,
    pub account: Option<String>,
    pub parent_category: Option<String>,
    pub saldo_anterior: i64,
    pub total_debito: i64,
    pub total_credito: i64,
    pub saldo_atual: i64,
    pub aliquota_cbs: Option<f64>,
    pub aliquota_ibs: Option<f64>,
    pub classificacao_tributaria_id: Option<i64>,
    pub id_conta_cenario_base_rumo: Option<i64>,
    pub is_approved: bool,
    pub ordem: Option<i64>,
    pub data_inicial: Option<NaiveDate>,
    pub data_final: Option<NaiveDate>,
    pub ano_base: Option<i32>,
    pub arquivo_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileCounts {
    pub pages: usize,
    pub records_extracted: usize,
    pub records_in_scope: usize,
    pub reference_accounts: usize,
    pub approved: usize,
    pub rejected: usize,
    pub rows_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileRunSummary {
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub source: String,
    pub source_sha256: Option<String>,
    pub db_path: String,
    pub data_inicial: Option<NaiveDate>,
    pub data_final: Option<NaiveDate>,
    pub ano_base: Option<i32>,
    pub counts: ReconcileCounts,
    pub warnings: Vec<String>,
}
