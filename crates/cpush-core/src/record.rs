//! Catalog records and the loader for cleaned catalog files.
//!
//! Records arrive already cleaned; the loader only rejects values that would
//! break the wire contract (empty code, negative or non-finite price).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One product as sent to the endpoint.
///
/// Serializes with the wire field names (`name_product`, `code`, `price`,
/// `stock`); deserialization also accepts the catalog's Portuguese column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "name_product", alias = "nome_produto", alias = "name")]
    pub name: String,
    #[serde(alias = "codigo")]
    pub code: String,
    #[serde(alias = "preco")]
    pub price: f64,
    #[serde(alias = "estoque")]
    pub stock: i64,
}

impl Record {
    pub fn new(name: impl Into<String>, code: impl Into<String>, price: f64, stock: i64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            price,
            stock,
        }
    }

    /// Request body for this record.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Contract check shared by the loader and the delivery client.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.code.trim().is_empty() {
            return Err("empty code");
        }
        if !self.price.is_finite() {
            return Err("price is not a finite number");
        }
        if self.price < 0.0 {
            return Err("negative price");
        }
        Ok(())
    }
}

/// Errors while loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("record #{index} (code {code:?}): {reason}")]
    Invalid {
        index: usize,
        code: String,
        reason: &'static str,
    },
}

/// Load records from a JSON array file or a JSON Lines file, in file order.
pub fn load_records(path: &Path) -> Result<Vec<Record>, RecordError> {
    let data = fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&data)?;
    tracing::debug!(count = records.len(), path = %path.display(), "loaded records");
    Ok(records)
}

/// Parse catalog text. A leading `[` selects array form, anything else is JSON Lines.
pub fn parse_records(data: &str) -> Result<Vec<Record>, RecordError> {
    let trimmed = data.trim_start_matches('\u{feff}').trim_start();
    let records: Vec<Record> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|source| RecordError::Parse {
            line: source.line(),
            source,
        })?
    } else {
        let mut out = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str(line)
                .map_err(|source| RecordError::Parse { line: i + 1, source })?;
            out.push(record);
        }
        out
    };

    for (index, record) in records.iter().enumerate() {
        record.check().map_err(|reason| RecordError::Invalid {
            index,
            code: record.code.clone(),
            reason,
        })?;
    }
    Ok(records)
}
