//! Transaction options handed to the SQL processor

use serde::{Deserialize, Serialize};

use crate::config::ConsoleConfig;
use crate::sql::statement::{
    ExclusiveMode, ReadWriteMode, StartTransactionFields, TransactionMode,
};

/// The fully resolved option set for one transaction: statement fields merged
/// with configuration defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOption {
    pub transaction_mode: TransactionMode,
    pub read_write_mode: Option<ReadWriteMode>,
    pub exclusive_mode: Option<ExclusiveMode>,
    pub write_preserve: Vec<String>,
    pub include_ddl: bool,
    pub read_area_include: Vec<String>,
    pub read_area_exclude: Vec<String>,
    pub label: Option<String>,
    pub properties: Vec<(String, String)>,
}

impl Default for TransactionOption {
    fn default() -> Self {
        Self {
            transaction_mode: TransactionMode::Short,
            read_write_mode: None,
            exclusive_mode: None,
            write_preserve: Vec::new(),
            include_ddl: false,
            read_area_include: Vec::new(),
            read_area_exclude: Vec::new(),
            label: None,
            properties: Vec::new(),
        }
    }
}

impl TransactionOption {
    /// Build the option for an explicit `START TRANSACTION` statement. The
    /// configured label is the fallback when the statement carries no `AS`
    /// label.
    pub fn from_fields(fields: &StartTransactionFields, config: &ConsoleConfig) -> Self {
        Self {
            transaction_mode: fields
                .transaction_mode
                .as_ref()
                .map(|m| m.value)
                .unwrap_or(TransactionMode::Short),
            read_write_mode: fields.read_write_mode.as_ref().map(|m| m.value),
            exclusive_mode: fields.exclusive_mode.as_ref().map(|m| m.value),
            write_preserve: fields
                .write_preserve
                .iter()
                .map(|t| t.value.clone())
                .collect(),
            include_ddl: fields.include_ddl,
            read_area_include: fields
                .read_area_include
                .iter()
                .map(|t| t.value.clone())
                .collect(),
            read_area_exclude: fields
                .read_area_exclude
                .iter()
                .map(|t| t.value.clone())
                .collect(),
            label: fields
                .label
                .as_ref()
                .map(|l| l.value.clone())
                .or_else(|| config.transaction_label.clone()),
            properties: fields
                .properties
                .iter()
                .map(|(k, v)| (k.value.clone(), v.value.clone()))
                .collect(),
        }
    }
}
