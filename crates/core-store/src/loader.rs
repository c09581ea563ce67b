use std::path::Path;

use snafu::ResultExt;

use crate::error::{self as store_error, StoreError, StoreResult};
use crate::service::StoreService;

/// Derive a table name from a CSV file stem: lowercased, spaces replaced
/// with underscores. Names that would not survive as bare SQL identifiers
/// are rejected rather than quoted.
pub fn table_name_from_stem(stem: &str) -> StoreResult<String> {
    let name = stem.trim().to_lowercase().replace(' ', "_");
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid_start || !valid_rest {
        return Err(StoreError::InvalidTableName { name });
    }
    Ok(name)
}

/// Load every `*.csv` file in `dir` into the store, one table per file.
/// Files are processed in path order so startup logging is deterministic.
/// Returns the names of the tables registered.
#[tracing::instrument(name = "loader::load_csv_dir", level = "debug", skip(store), err)]
pub async fn load_csv_dir(store: &StoreService, dir: &Path) -> StoreResult<Vec<String>> {
    let entries = std::fs::read_dir(dir).context(store_error::CsvDirReadSnafu {
        path: dir.display().to_string(),
    })?;

    let mut csv_paths = Vec::new();
    for entry in entries {
        let entry = entry.context(store_error::CsvDirReadSnafu {
            path: dir.display().to_string(),
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
            csv_paths.push(path);
        }
    }
    csv_paths.sort();

    let mut tables = Vec::new();
    for path in csv_paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| StoreError::InvalidTableName {
                name: path.display().to_string(),
            })?;
        let table = table_name_from_stem(stem)?;
        store
            .register_csv_path(&table, &path.display().to_string())
            .await?;
        tracing::info!(table, path = %path.display(), "loaded CSV file");
        tables.push(table);
    }
    Ok(tables)
}
