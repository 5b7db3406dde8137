//! ID resolver module
//!
//! Lets users name a job by an unambiguous prefix of its ID.

use anyhow::{Context, Result, anyhow};
use seismo_client::SeismoClient;

/// Resolve a job ID or prefix to a full ID
///
/// An exact match wins over longer IDs sharing the same prefix.
pub async fn resolve_job_id(client: &SeismoClient, id_or_prefix: &str) -> Result<String> {
    let ids = client
        .list_jobs()
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    match_prefix(&ids, id_or_prefix, "job")
}

/// Pick the single candidate starting with `prefix` (case-insensitive)
pub fn match_prefix(candidates: &[String], prefix: &str, kind: &str) -> Result<String> {
    if candidates.iter().any(|id| id == prefix) {
        return Ok(prefix.to_string());
    }

    let prefix = prefix.to_lowercase();
    let matches: Vec<&String> = candidates
        .iter()
        .filter(|id| id.to_lowercase().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No {} found with ID starting with '{}'", kind, prefix)),
        [only] => Ok((*only).clone()),
        many => {
            let ids: Vec<&str> = many.iter().map(|id| id.as_str()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}
