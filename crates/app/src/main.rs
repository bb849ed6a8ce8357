use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use log::info;

use campus_core::model::AssessmentId;
use services::config::parse_base_url;
use services::{AccessToken, AssessmentClientConfig, AssessmentService, Clock, HttpAssessmentService};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidExamId { raw: String },
    InvalidApiUrl { raw: String, reason: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExamId { raw } => write!(f, "invalid --exam value: {raw:?}"),
            ArgsError::InvalidApiUrl { raw, reason } => {
                write!(f, "invalid --api value {raw:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    assessments: Arc<dyn AssessmentService>,
    default_assessment: Option<AssessmentId>,
}

impl UiApp for DesktopApp {
    fn assessments(&self) -> Arc<dyn AssessmentService> {
        Arc::clone(&self.assessments)
    }

    fn default_assessment(&self) -> Option<AssessmentId> {
        self.default_assessment.clone()
    }
}

#[derive(Debug)]
struct Args {
    client: AssessmentClientConfig,
    exam: Option<AssessmentId>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api <base_url>] [--token <token>] [--exam <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api {}", services::config::DEFAULT_BASE_URL);
    eprintln!();
    eprintln!("Environment (a .env file is read if present):");
    eprintln!("  CAMPUS_API_BASE_URL, CAMPUS_API_TOKEN, CAMPUS_API_TIMEOUT_SECS, CAMPUS_EXAM_ID");
    eprintln!("  RUST_LOG (default: info)");
}

impl Args {
    /// Start from the environment, then let flags override it.
    fn parse(
        client: AssessmentClientConfig,
        exam: Option<String>,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut client = client;
        let mut exam = exam
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| AssessmentId::new(raw.clone()).map_err(|_| ArgsError::InvalidExamId { raw }))
            .transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    let value = require_value(args, "--api")?;
                    client.base_url = parse_base_url(&value).map_err(|err| {
                        ArgsError::InvalidApiUrl {
                            raw: value.clone(),
                            reason: err.to_string(),
                        }
                    })?;
                }
                "--token" => {
                    let value = require_value(args, "--token")?;
                    client.credentials = AccessToken::new(value);
                }
                "--exam" => {
                    let value = require_value(args, "--exam")?;
                    let parsed = AssessmentId::new(value.clone())
                        .map_err(|_| ArgsError::InvalidExamId { raw: value })?;
                    exam = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { client, exam })
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(
        AssessmentClientConfig::from_env()?,
        std::env::var("CAMPUS_EXAM_ID").ok(),
        &mut argv,
    )
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    info!(
        "assessment service at {} ({})",
        parsed.client.base_url,
        if parsed.client.credentials.is_some() {
            "authenticated"
        } else {
            "anonymous"
        }
    );

    let service = HttpAssessmentService::new(parsed.client, Clock::default_clock())?;
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        assessments: Arc::new(service),
        default_assessment: parsed.exam,
    });
    let context = build_app_context(&app);

    // The desktop launcher owns the async runtime that the session clock and
    // HTTP client run on.
    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Campus")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(exam: Option<&str>, args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(
            AssessmentClientConfig::parse(services::config::DEFAULT_BASE_URL).unwrap(),
            exam.map(str::to_string),
            &mut iter,
        )
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            Some("env-exam"),
            &["--api", "https://lms.example/api", "--token", "t0k", "--exam", "quiz-7"],
        )
        .unwrap();
        assert_eq!(args.client.base_url.as_str(), "https://lms.example/api");
        assert_eq!(args.client.credentials.unwrap().expose(), "t0k");
        assert_eq!(args.exam.unwrap().as_str(), "quiz-7");
    }

    #[test]
    fn environment_exam_is_used_without_flags() {
        let args = parse(Some("env-exam"), &[]).unwrap();
        assert_eq!(args.exam.unwrap().as_str(), "env-exam");
        assert!(args.client.credentials.is_none());
    }

    #[test]
    fn blank_environment_exam_is_ignored() {
        assert!(parse(Some("  "), &[]).unwrap().exam.is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(None, &["--exam"]),
            Err(ArgsError::MissingValue { flag: "--exam" })
        ));
        assert!(matches!(
            parse(None, &["--exam", " "]),
            Err(ArgsError::InvalidExamId { .. })
        ));
        for api in ["localhost", "localhost:8080/api", "ftp://lms.example"] {
            assert!(
                matches!(parse(None, &["--api", api]), Err(ArgsError::InvalidApiUrl { .. })),
                "{api} accepted"
            );
        }
        assert!(matches!(
            parse(None, &["--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }
}
