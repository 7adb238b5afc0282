pub mod config;
pub mod pipeline;

use config::AppConfig;
use pipeline::{Workflow, WorkflowStage};
use snap_capture::InteractiveCapture;
use snap_llm::OpenAiClient;
use std::process::ExitCode;
use std::sync::Arc;

pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "snap_help_lib=info,snap_vision=info,snap_capture=info,snap_advisor=info,snap_data=info".into()
            }),
        )
        .init();

    let config = match AppConfig::from_env(config::resolve_project_root()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Project directory: {}", config.project_root.display());

    // One client for the whole run, shared by every model request
    let model = match OpenAiClient::new(config.llm.clone()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create the model client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start the async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let workflow = Workflow::new(config, Arc::new(model), Arc::new(InteractiveCapture::new()));
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();

    match runtime.block_on(workflow.run(&mut input, &mut out)) {
        WorkflowStage::Done => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
