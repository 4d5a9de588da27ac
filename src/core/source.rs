use crate::core::{RecordSource, Storage};
use crate::domain::model::{AttributeValue, CandidateItem, Scope, UserProfile};
use crate::utils::error::{Result, SelectError};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Deserialize)]
struct CandidateRow {
    id: String,
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    scope: String,
}

/// Loads candidates and the profile from CSV files through a [`Storage`].
pub struct CsvRecordSource<S: Storage> {
    storage: S,
    candidates_path: String,
    profile_path: String,
}

impl<S: Storage> CsvRecordSource<S> {
    pub fn new(storage: S, candidates_path: impl Into<String>, profile_path: impl Into<String>) -> Self {
        Self {
            storage,
            candidates_path: candidates_path.into(),
            profile_path: profile_path.into(),
        }
    }

    async fn read_non_empty(&self, path: &str) -> Result<Vec<u8>> {
        let data = self.storage.read_file(path).await?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(SelectError::SourceError {
                path: path.to_string(),
                reason: "is empty".to_string(),
            });
        }
        Ok(data)
    }
}

#[async_trait]
impl<S: Storage> RecordSource for CsvRecordSource<S> {
    async fn load_candidates(&self) -> Result<Vec<CandidateItem>> {
        let data = self.read_non_empty(&self.candidates_path).await?;
        let candidates = parse_candidates(&data, &self.candidates_path)?;
        tracing::info!(
            "Loaded {} candidates from {}",
            candidates.len(),
            self.candidates_path
        );
        Ok(candidates)
    }

    async fn load_profile(&self) -> Result<UserProfile> {
        let data = self.read_non_empty(&self.profile_path).await?;
        let profile = parse_profile(&data, &self.profile_path)?;
        tracing::info!("Loaded profile '{}' from {}", profile.id, self.profile_path);
        Ok(profile)
    }
}

/// Accepted spellings, case-insensitive. An empty cell is `Unset`.
pub fn parse_scope(raw: &str) -> Option<Scope> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Some(Scope::Unset),
        "national" | "nat" => Some(Scope::National),
        "regional" | "region" | "local" => Some(Scope::Regional),
        _ => None,
    }
}

/// Parse and validate a candidates CSV with header `id,name,region,category,scope`.
pub fn parse_candidates(data: &[u8], path: &str) -> Result<Vec<CandidateItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut candidates = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, row) in reader.deserialize::<CandidateRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = row?;

        if row.id.is_empty() {
            return Err(SelectError::validation(format!(
                "{}:{}: id must not be empty",
                path, line
            )));
        }
        if row.name.is_empty() {
            return Err(SelectError::validation(format!(
                "{}:{}: name must not be empty for '{}'",
                path, line, row.id
            )));
        }
        let scope = parse_scope(&row.scope).ok_or_else(|| {
            SelectError::validation(format!(
                "{}:{}: unknown scope '{}' for '{}'",
                path, line, row.scope, row.id
            ))
        })?;
        if scope == Scope::Regional && row.region.is_empty() {
            return Err(SelectError::validation(format!(
                "{}:{}: regional candidate '{}' has no region",
                path, line, row.id
            )));
        }
        if !seen_ids.insert(row.id.clone()) {
            return Err(SelectError::validation(format!(
                "{}:{}: duplicate id '{}'",
                path, line, row.id
            )));
        }

        candidates.push(CandidateItem {
            id: row.id,
            name: row.name,
            region: row.region,
            category: row.category,
            scope,
        });
    }

    if candidates.is_empty() {
        return Err(SelectError::SourceError {
            path: path.to_string(),
            reason: "contains no candidate rows".to_string(),
        });
    }

    let unset = candidates.iter().filter(|c| c.scope == Scope::Unset).count();
    if unset > 0 {
        tracing::debug!("{} candidates have no scope and will never be selected", unset);
    }

    Ok(candidates)
}

/// Parse a single-row profile CSV. Columns other than `id`, `name` and `region`
/// become coerced attributes.
pub fn parse_profile(data: &[u8], path: &str) -> Result<UserProfile> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut rows = reader.records();
    let record = match rows.next() {
        Some(record) => record?,
        None => {
            return Err(SelectError::SourceError {
                path: path.to_string(),
                reason: "contains no profile row".to_string(),
            })
        }
    };
    let extra = rows.count();
    if extra > 0 {
        return Err(SelectError::validation(format!(
            "{}: expected exactly one profile row, found {}",
            path,
            extra + 1
        )));
    }

    let mut profile = UserProfile::default();
    let mut attributes = BTreeMap::new();
    for (header, value) in headers.iter().zip(record.iter()) {
        match header.to_ascii_lowercase().as_str() {
            "id" => profile.id = value.to_string(),
            "name" => profile.name = value.to_string(),
            "region" => profile.region = value.to_string(),
            _ => {
                if let Some(parsed) = AttributeValue::parse(value) {
                    attributes.insert(header.to_string(), parsed);
                }
            }
        }
    }
    profile.attributes = attributes;

    profile.validate()?;
    Ok(profile)
}
