use anyhow::Context;
use bpr_core::{
    config::{policy_path_from_env_value, resolve_policy},
    constants::DEFAULT_PATIENT_DATA_DIR,
    ClinicalAnalysis, CoreConfig, PatientId, ScreeningEngine, ScreeningInput, ScreeningPolicy,
    ScreeningRecord, ScreeningService,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bpr")]
#[command(about = "BPR medical screening CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a screening file (JSON or YAML)
    Analyze {
        /// Screening answers file
        file: PathBuf,
        /// Policy file to use instead of the configured one
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Inspect or check screening policies
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// List all stored screenings
    List,
    /// Print a clinical report for a stored screening
    Report {
        /// Patient identifier
        patient_id: String,
    },
}

#[derive(Subcommand)]
enum PolicyCommands {
    /// Print the policy in force as YAML
    Show,
    /// Parse and validate a policy file
    Validate {
        /// Policy file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bpr_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let policy_override = policy_path_from_env_value(std::env::var("BPR_SCREENING_POLICY").ok());

    match cli.command {
        Some(Commands::Analyze {
            file,
            policy,
            format,
        }) => {
            let policy = resolve_policy(policy.or(policy_override))?;
            let engine = ScreeningEngine::new(policy)?;
            let input = read_screening(&file)?;
            let analysis = engine.analyze(&input);

            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(&analysis)?,
                Format::Yaml => serde_yaml::to_string(&analysis)?,
            };
            println!("{rendered}");
        }
        Some(Commands::Policy {
            command: PolicyCommands::Show,
        }) => {
            let policy = resolve_policy(policy_override)?;
            print!("{}", policy.render()?);
        }
        Some(Commands::Policy {
            command: PolicyCommands::Validate { file },
        }) => {
            let policy = ScreeningPolicy::load(&file)?;
            println!("Policy {} is valid: {}", policy.version, file.display());
        }
        Some(Commands::List) => {
            let cfg = core_config(policy_override)?;
            let data_dir = cfg.patient_data_dir().display().to_string();
            let records = ScreeningService::new(cfg).list();
            if records.is_empty() {
                println!("No screenings found in {data_dir}.");
            } else {
                for record in records {
                    println!(
                        "ID: {}, Name: {}, Submitted: {}, Updated: {}",
                        record.patient_id,
                        record.patient_name,
                        record.submitted_at.to_rfc3339(),
                        record.updated_at.to_rfc3339()
                    );
                }
            }
        }
        Some(Commands::Report { patient_id }) => {
            let cfg = core_config(policy_override)?;
            let engine = ScreeningEngine::new(cfg.policy().clone())?;
            let service = ScreeningService::new(cfg);

            let patient_id = PatientId::parse(&patient_id)?;
            let record = service.load(&patient_id)?.with_context(|| {
                format!("patient {patient_id} has not completed medical screening yet")
            })?;
            let analysis = engine.analyze(&record.screening);
            print!("{}", render_report(engine.policy(), &record, &analysis));
        }
        None => {
            println!("Use 'bpr --help' for commands");
        }
    }

    Ok(())
}

fn core_config(policy_override: Option<PathBuf>) -> anyhow::Result<Arc<CoreConfig>> {
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into());
    let policy = resolve_policy(policy_override)?;
    Ok(Arc::new(CoreConfig::new(
        PathBuf::from(patient_data_dir),
        policy,
    )?))
}

/// Reads screening answers, as YAML when the extension says so and JSON otherwise.
fn read_screening(path: &Path) -> anyhow::Result<ScreeningInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let input = if is_yaml {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(input)
}

fn render_report(
    policy: &ScreeningPolicy,
    record: &ScreeningRecord,
    analysis: &ClinicalAnalysis,
) -> String {
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("Patient: {} ({})", record.patient_name, record.patient_id));
    line(format!("Screening completed: {}", record.updated_at.to_rfc3339()));
    line(format!("Policy: {}", analysis.policy_version));
    line(String::new());
    line(analysis.clinical_summary.clone());

    line(String::new());
    line("Red flags:".into());
    if analysis.red_flags.is_empty() {
        line("  none".into());
    }
    for flag in &analysis.red_flags {
        line(format!("  [{:?}] {}: {}", flag.severity, flag.flag, flag.suggested_action));
    }
    for reason in &analysis.escalation_reasons {
        line(format!("  escalated: {reason}"));
    }

    line(String::new());
    line("Modalities:".into());
    for (modality, decision) in &analysis.modality_gating {
        match &decision.reason {
            Some(reason) => line(format!(
                "  {:<28} {:?}: {}",
                modality.display_name(),
                decision.status,
                reason
            )),
            None => line(format!("  {:<28} {:?}", modality.display_name(), decision.status)),
        }
    }

    line(String::new());
    line("Follow-up questions:".into());
    for question in &analysis.follow_up_questions {
        line(format!("  - {question}"));
        let Some(follow_up) = policy.follow_up_for(question) else {
            continue;
        };
        let Some(why) = &follow_up.why_it_matters else {
            continue;
        };
        if follow_up.impacts.is_empty() {
            line(format!("      why: {why}"));
        } else {
            let impacts: Vec<_> = follow_up.impacts.iter().map(|c| format!("{c:?}")).collect();
            line(format!("      why: {why} (affects {})", impacts.join(", ")));
        }
    }

    line(String::new());
    line(format!(
        "First session: {} minutes ({})",
        analysis.session_plan.recommended_minutes, analysis.session_plan.justification
    ));
    for priority in &analysis.session_plan.assessment_priorities {
        line(format!("  - {priority}"));
    }

    out
}
