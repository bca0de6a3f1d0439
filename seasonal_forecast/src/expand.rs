//! Group expansion: composite group keys to elementary groups
//!
//! Metro-level feeds label records like `"Huntington-Ashland, WV-KY-OH"`.
//! Each code after the last comma is an elementary group, and the record is
//! duplicated (not divided) into every one of them.

use crate::data::{ElementaryGroupObservation, Observation};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How group keys map to elementary groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionRule {
    /// Keys are already elementary; one record in, one record out
    #[default]
    Identity,
    /// `"<name>, <code1>-<code2>-..."` or a plain code; fan out per code
    CompositeCodes,
}

/// Result of expanding a batch of observations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// Elementary records with non-empty keys
    pub records: Vec<ElementaryGroupObservation>,
    /// Observations dropped because their key was malformed
    pub malformed: usize,
    /// Elementary records dropped because their key fragment was empty
    pub degenerate: usize,
}

/// Expand one observation according to `rule`
///
/// Under `CompositeCodes` an empty fragment (e.g. `"Metro, "` or
/// `"WV--OH"`) yields a record with an empty key; callers decide whether to
/// keep it. A key that is blank in its entirety is a `MalformedGroupKey`.
pub fn expand(
    observation: &Observation,
    rule: ExpansionRule,
) -> Result<Vec<ElementaryGroupObservation>> {
    match rule {
        ExpansionRule::Identity => Ok(vec![ElementaryGroupObservation::new(
            observation.date,
            observation.group_key.clone(),
            observation.value,
        )]),
        ExpansionRule::CompositeCodes => {
            let key = observation.group_key.trim();
            if key.is_empty() {
                return Err(ForecastError::MalformedGroupKey(
                    observation.group_key.clone(),
                ));
            }

            let code_field = match key.rsplit_once(',') {
                Some((_, codes)) => codes,
                None => key,
            };

            Ok(code_field
                .split('-')
                .map(|code| {
                    ElementaryGroupObservation::new(
                        observation.date,
                        code.trim(),
                        observation.value,
                    )
                })
                .collect())
        }
    }
}

/// Expand a batch, dropping malformed keys and empty fragments with a warning
pub fn expand_all(observations: &[Observation], rule: ExpansionRule) -> Expansion {
    let mut expansion = Expansion::default();

    for observation in observations {
        match expand(observation, rule) {
            Ok(records) => {
                for record in records {
                    if record.is_degenerate() {
                        warn!(
                            key = %observation.group_key,
                            date = %observation.date,
                            "dropping empty group code"
                        );
                        expansion.degenerate += 1;
                    } else {
                        expansion.records.push(record);
                    }
                }
            }
            Err(e) => {
                warn!(date = %observation.date, error = %e, "dropping record");
                expansion.malformed += 1;
            }
        }
    }

    expansion
}
