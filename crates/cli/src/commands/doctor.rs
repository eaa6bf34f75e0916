use concierge_agent::build_llm_client;
use concierge_core::config::{AppConfig, LoadOptions};
use concierge_db::{connect_with_config, DemoSeedDataset};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_provider(&config));
            checks.extend(check_record_store(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["llm_provider", "database_connectivity", "demo_records"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    summarize(checks)
}

fn summarize(checks: Vec<DoctorCheck>) -> DoctorReport {
    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let skipped = checks.iter().any(|check| check.status == CheckStatus::Skipped);
    let (overall_status, summary) = if failed || skipped {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if checks.iter().any(|check| check.status == CheckStatus::Warn) {
        (CheckStatus::Warn, "doctor: ready with warnings")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_llm_provider(config: &AppConfig) -> DoctorCheck {
    match build_llm_client(&config.llm) {
        Ok(Some(client)) => DoctorCheck {
            name: "llm_provider",
            status: CheckStatus::Pass,
            details: format!("{} client built for model `{}`", client.provider(), config.llm.model),
        },
        Ok(None) => DoctorCheck {
            name: "llm_provider",
            status: CheckStatus::Pass,
            details: "disabled; replies are tool output verbatim".to_string(),
        },
        Err(error) => {
            DoctorCheck { name: "llm_provider", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

/// Connectivity plus whether the demo records are present. Missing demo records only warn.
fn check_record_store(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            }];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {error}"),
                    },
                    DoctorCheck {
                        name: "demo_records",
                        status: CheckStatus::Skipped,
                        details: "skipped because the database is unreachable".to_string(),
                    },
                ];
            }
        };

        let connectivity = DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        };
        let demo_records = match DemoSeedDataset::verify(&pool).await {
            Ok(verification) if verification.all_present => DoctorCheck {
                name: "demo_records",
                status: CheckStatus::Pass,
                details: "demo records present".to_string(),
            },
            Ok(verification) => DoctorCheck {
                name: "demo_records",
                status: CheckStatus::Warn,
                details: format!(
                    "missing: {}; run `concierge seed`",
                    verification.failed_checks().join(", ")
                ),
            },
            Err(error) => DoctorCheck {
                name: "demo_records",
                status: CheckStatus::Warn,
                details: format!("could not inspect records ({error}); run `concierge migrate`"),
            },
        };

        pool.close().await;
        vec![connectivity, demo_records]
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{render_human, summarize, CheckStatus, DoctorCheck};

    fn check(name: &'static str, status: CheckStatus) -> DoctorCheck {
        DoctorCheck { name, status, details: "details".to_string() }
    }

    #[test]
    fn warnings_do_not_fail_the_report() {
        let report = summarize(vec![
            check("config_validation", CheckStatus::Pass),
            check("demo_records", CheckStatus::Warn),
        ]);

        assert_eq!(report.overall_status, CheckStatus::Warn);
        assert!(render_human(&report).contains("- [warn] demo_records: details"));
    }

    #[test]
    fn skipped_checks_fail_the_report() {
        let report = summarize(vec![
            check("config_validation", CheckStatus::Fail),
            check("llm_provider", CheckStatus::Skipped),
        ]);

        assert_eq!(report.overall_status, CheckStatus::Fail);
    }
}
