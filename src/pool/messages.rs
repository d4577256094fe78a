//! Wire shapes for simulation work requests and responses.
//!
//! Requests are self-contained: a worker needs nothing beyond the request to
//! produce its result, and the same request always produces the same result.

use crate::blocks::FragmentKind;
use crate::character::{CardConfig, DerivedStats};
use crate::error::SimError;
use crate::sim::{FragmentSummary, RunSample, SimOptions, StageSummary};
use serde::{Deserialize, Serialize};

/// Which reduction the worker applies to its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    /// Many runs reduced to floor/XP/fragment rates.
    StageSummary,
    /// Many runs reduced to one target fragment's rate.
    FragmentSummary,
    /// Many runs returned as raw per-run samples.
    StageLite,
}

/// One unit of simulation work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub kind: RequestKind,
    pub stats: DerivedStats,
    pub starting_floor: u32,
    pub run_count: u32,
    #[serde(default)]
    pub options: SimOptions,
    #[serde(default)]
    pub card_config: CardConfig,
    pub seed: u64,
    /// Required for `fragmentSummary` requests, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fragment: Option<FragmentKind>,
}

impl WorkRequest {
    pub fn stage_summary(stats: DerivedStats, starting_floor: u32, run_count: u32, seed: u64) -> Self {
        Self {
            kind: RequestKind::StageSummary,
            stats,
            starting_floor,
            run_count,
            options: SimOptions::default(),
            card_config: CardConfig::default(),
            seed,
            target_fragment: None,
        }
    }

    pub fn fragment_summary(
        stats: DerivedStats,
        starting_floor: u32,
        run_count: u32,
        seed: u64,
        target: FragmentKind,
    ) -> Self {
        Self {
            kind: RequestKind::FragmentSummary,
            target_fragment: Some(target),
            ..Self::stage_summary(stats, starting_floor, run_count, seed)
        }
    }

    pub fn stage_lite(stats: DerivedStats, starting_floor: u32, run_count: u32, seed: u64) -> Self {
        Self {
            kind: RequestKind::StageLite,
            ..Self::stage_summary(stats, starting_floor, run_count, seed)
        }
    }
}

/// A worker's successful payload, one variant per request kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkResult {
    StageSummary(StageSummary),
    FragmentSummary(FragmentSummary),
    StageLite(Vec<RunSample>),
}

impl WorkResult {
    pub fn into_stage_summary(self) -> Option<StageSummary> {
        match self {
            WorkResult::StageSummary(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn into_fragment_summary(self) -> Option<FragmentSummary> {
        match self {
            WorkResult::FragmentSummary(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn into_lite_samples(self) -> Option<Vec<RunSample>> {
        match self {
            WorkResult::StageLite(samples) => Some(samples),
            _ => None,
        }
    }
}

/// The response envelope as it crosses a serialization boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum WorkResponse {
    Ok { result: WorkResult },
    Error { message: String },
}

impl From<Result<WorkResult, SimError>> for WorkResponse {
    fn from(result: Result<WorkResult, SimError>) -> Self {
        match result {
            Ok(result) => WorkResponse::Ok { result },
            Err(err) => WorkResponse::Error {
                message: err.to_string(),
            },
        }
    }
}

impl WorkResponse {
    pub fn into_result(self) -> Result<WorkResult, SimError> {
        match self {
            WorkResponse::Ok { result } => Ok(result),
            WorkResponse::Error { message } => Err(SimError::Worker(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{resolve_stats, CharacterBuild};

    #[test]
    fn test_request_kind_wire_names_are_camel_case() {
        assert_eq!(
            serde_json::to_string(&RequestKind::StageSummary).unwrap(),
            "\"stageSummary\""
        );
        assert_eq!(
            serde_json::to_string(&RequestKind::FragmentSummary).unwrap(),
            "\"fragmentSummary\""
        );
        assert_eq!(
            serde_json::to_string(&RequestKind::StageLite).unwrap(),
            "\"stageLite\""
        );
    }

    #[test]
    fn test_request_round_trips_with_camel_case_fields() {
        let stats = resolve_stats(&CharacterBuild::default());
        let request = WorkRequest::fragment_summary(stats, 12, 40, 99, FragmentKind::Amber);

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"startingFloor\":12"));
        assert!(json.contains("\"runCount\":40"));
        assert!(json.contains("\"targetFragment\""));

        let parsed: WorkRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, RequestKind::FragmentSummary);
        assert_eq!(parsed.target_fragment, Some(FragmentKind::Amber));
        assert_eq!(parsed.seed, 99);
    }

    #[test]
    fn test_request_defaults_options_when_absent() {
        let stats = resolve_stats(&CharacterBuild::default());
        let json = format!(
            r#"{{"kind":"stageSummary","stats":{},"startingFloor":1,"runCount":5,"seed":7}}"#,
            serde_json::to_string(&stats).unwrap()
        );
        let parsed: WorkRequest = serde_json::from_str(&json).unwrap();
        assert!(parsed.options.use_crit);
        assert_eq!(parsed.card_config, CardConfig::default());
        assert_eq!(parsed.target_fragment, None);
    }

    #[test]
    fn test_response_envelope_is_status_tagged() {
        let err: WorkResponse = Err::<WorkResult, _>(SimError::EmptyBudget).into();
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"status\":\"error\""));

        let back: WorkResponse = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.into_result(), Err(SimError::Worker(_))));
    }
}
