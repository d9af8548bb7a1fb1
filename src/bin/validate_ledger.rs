use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tokio::task::JoinSet;

use ledger_validator::domain::AssetProof;
use ledger_validator::infra::ProofArchive;
use ledger_validator::telemetry::{init_telemetry, TelemetryConfig};
use ledger_validator::{
    LedgerValidationEngine, LedgerValidationResult, Party, ValidationError, ValidationReport,
    ValidatorConfig,
};

const ASSET_ID_FORMAT: &str =
    "--asset-id is malformed: the format should be \"[assetId]\" or \"[assetId],[startAge],[endAge]\".";

fn print_help() {
    eprintln!(
        "\
validate-ledger

Validate assets recorded by both the ledger and the auditor.

USAGE:
  validate-ledger --asset-id <ID[,START,END]> [--asset-id ...] [options]

OPTIONS:
  --asset-id <spec>        (required, repeatable) 'asset_id' validates the latest
                           age; 'asset_id,start_age,end_age' validates a range
  --archive <path>         Proof archive to validate against
                           (defaults to env LEDGER_VALIDATOR_ARCHIVE)
  --detailed               Include every age's verdict in the output
  --verbose                Debug logging on stderr
  -h, --help               Print this help

ENV:
  LEDGER_VALIDATOR_FETCH_TIMEOUT_MS / LEDGER_VALIDATOR_MAX_RANGE /
  LEDGER_VALIDATOR_MAX_RETRIES / LEDGER_VALIDATOR_TRANSPORT_AS_ABSENT
  LOG_LEVEL / LOG_JSON / LOG_CONSOLE
"
    );
}

/// What to validate for one asset
#[derive(Debug, Clone, PartialEq, Eq)]
enum AssetRequest {
    Latest { id: String },
    Range { id: String, start: u64, end: u64 },
}

impl AssetRequest {
    fn parse(spec: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = spec.split(',').collect();
        match parts.as_slice() {
            [id] => Ok(Self::Latest { id: id.to_string() }),
            [id, start, end] => {
                let parse_age = |raw: &str| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|_| anyhow::anyhow!("--asset-id contains an invalid integer."))
                };
                Ok(Self::Range {
                    id: id.to_string(),
                    start: parse_age(start)?,
                    end: parse_age(end)?,
                })
            }
            _ => anyhow::bail!(ASSET_ID_FORMAT),
        }
    }
}

struct Options {
    requests: Vec<AssetRequest>,
    archive: Option<PathBuf>,
    detailed: bool,
    verbose: bool,
}

fn parse_args(mut args: VecDeque<String>) -> anyhow::Result<Option<Options>> {
    let mut options = Options {
        requests: Vec::new(),
        archive: None,
        detailed: false,
        verbose: false,
    };

    while let Some(arg) = args.pop_front() {
        match arg.as_str() {
            "--asset-id" => {
                let raw = args
                    .pop_front()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --asset-id"))?;
                options.requests.push(AssetRequest::parse(&raw)?);
            }
            "--archive" => {
                let raw = args
                    .pop_front()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --archive"))?;
                options.archive = Some(PathBuf::from(raw));
            }
            "--detailed" => options.detailed = true,
            "--verbose" => options.verbose = true,
            "-h" | "--help" => return Ok(None),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    if options.requests.is_empty() {
        anyhow::bail!("--asset-id is required");
    }
    Ok(Some(options))
}

fn proof_json(proof: Option<&AssetProof>) -> serde_json::Value {
    proof
        .map(|p| serde_json::to_value(p).unwrap_or(serde_json::Value::Null))
        .unwrap_or(serde_json::Value::Null)
}

fn result_json(result: &LedgerValidationResult) -> serde_json::Value {
    json!({
        "status_code": result.code,
        "Ledger": proof_json(result.ledger_proof.as_ref()),
        "Auditor": proof_json(result.auditor_proof.as_ref()),
    })
}

/// Verdict for one asset, with per-age detail when requested
fn report_json(report: &ValidationReport, detailed: bool) -> serde_json::Result<serde_json::Value> {
    let mut output = result_json(&report.result);
    if detailed {
        output["ages"] = serde_json::to_value(&report.ages)?;
    }
    Ok(output)
}

fn error_json(err: &ValidationError) -> serde_json::Value {
    let status = if err.is_input_error() {
        "INVALID_REQUEST"
    } else {
        "VALIDATION_ABORTED"
    };
    json!({ "status_code": status, "error_message": err.to_string() })
}

async fn run_request(
    engine: &LedgerValidationEngine,
    request: &AssetRequest,
) -> Result<ValidationReport, ValidationError> {
    match request {
        AssetRequest::Latest { id } => engine.validate_latest_detailed(id).await,
        AssetRequest::Range { id, start, end } => engine.validate_detailed(id, *start, *end).await,
    }
}

async fn build_engine(archive_path: PathBuf) -> anyhow::Result<LedgerValidationEngine> {
    let config = ValidatorConfig::from_env()?;
    let archive = ProofArchive::load(&archive_path)
        .await
        .with_context(|| format!("loading archive {}", archive_path.display()))?;
    let store = archive.proof_store().await?;
    let keys = archive.key_registry()?;

    Ok(LedgerValidationEngine::new(
        Arc::new(store.source(Party::Ledger)),
        Arc::new(store.source(Party::Auditor)),
        Arc::new(keys),
        Arc::new(store),
        config,
    )?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: VecDeque<String> = std::env::args().skip(1).collect();
    let options = match parse_args(args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_help();
            return Ok(());
        }
        Err(e) => {
            println!("{e}");
            std::process::exit(1);
        }
    };

    let mut telemetry = TelemetryConfig::from_env();
    if options.verbose {
        telemetry = telemetry.verbose();
    }
    if let Err(e) = init_telemetry(&telemetry) {
        eprintln!("failed to initialize logging: {e}");
    }

    let archive_path = options
        .archive
        .or_else(|| std::env::var("LEDGER_VALIDATOR_ARCHIVE").ok().map(PathBuf::from))
        .ok_or_else(|| anyhow::anyhow!("--archive is required (or set LEDGER_VALIDATOR_ARCHIVE)"))?;
    let engine = Arc::new(build_engine(archive_path).await?);

    // Assets are independent; validate them concurrently, report in input order
    let mut tasks = JoinSet::new();
    for (index, request) in options.requests.into_iter().enumerate() {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move { (index, run_request(&engine, &request).await) });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("validation task panicked")?);
    }
    outcomes.sort_by_key(|(index, _)| *index);

    for (_, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                let output = report_json(&report, options.detailed)?;
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Err(e) => {
                println!("{}", serde_json::to_string_pretty(&error_json(&e))?);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> VecDeque<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_latest_and_range() {
        assert_eq!(
            AssetRequest::parse("asset-1").unwrap(),
            AssetRequest::Latest {
                id: "asset-1".into()
            }
        );
        assert_eq!(
            AssetRequest::parse("asset-1,2,5").unwrap(),
            AssetRequest::Range {
                id: "asset-1".into(),
                start: 2,
                end: 5
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_specs() {
        let err = AssetRequest::parse("asset-1,2").unwrap_err();
        assert_eq!(err.to_string(), ASSET_ID_FORMAT);

        let err = AssetRequest::parse("asset-1,-1,5").unwrap_err();
        assert_eq!(err.to_string(), "--asset-id contains an invalid integer.");

        assert!(AssetRequest::parse("asset-1,a,b").is_err());
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&[
            "--asset-id",
            "a",
            "--asset-id",
            "b,0,3",
            "--archive",
            "proofs.json",
            "--detailed",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(options.requests.len(), 2);
        assert_eq!(options.archive, Some(PathBuf::from("proofs.json")));
        assert!(options.detailed);
        assert!(!options.verbose);

        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--asset-id"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_result_json_shape() {
        let proof = AssetProof::new("asset-1", 5, "n", [0u8; 32], [0u8; 64]);
        let result = LedgerValidationResult::new(
            ledger_validator::StatusCode::OneSideMissing,
            Some(proof),
            None,
        );
        let value = result_json(&result);

        assert_eq!(value["status_code"], "ONE_SIDE_MISSING");
        assert_eq!(value["Ledger"]["age"], 5);
        assert!(value["Auditor"].is_null());
    }

    #[test]
    fn test_report_json_includes_latest_age_detail() {
        use ledger_validator::domain::{AgeReport, LinkStatus, SideReport};
        use ledger_validator::StatusCode;

        let side = SideReport {
            signature_valid: true,
            link: LinkStatus::Ok,
        };
        let report = ValidationReport {
            asset_id: "asset-1".into(),
            ages: vec![AgeReport {
                age: 7,
                code: StatusCode::Ok,
                ledger: Some(side),
                auditor: Some(side),
            }],
            result: LedgerValidationResult::new(StatusCode::Ok, None, None),
        };

        let value = report_json(&report, true).unwrap();
        assert_eq!(value["ages"][0]["age"], 7);
        assert_eq!(value["ages"][0]["code"], "OK");

        let value = report_json(&report, false).unwrap();
        assert!(value.get("ages").is_none());
    }

    #[test]
    fn test_error_json_distinguishes_input_errors() {
        let value = error_json(&ValidationError::InvalidRange { start: 4, end: 1 });
        assert_eq!(value["status_code"], "INVALID_REQUEST");

        let value = error_json(&ValidationError::Configuration("x".into()));
        assert_eq!(value["status_code"], "VALIDATION_ABORTED");
    }
}
