use anyhow::{anyhow, Context, Result};
use snap_capture::BoardCapture;
use snap_data::CardAbilities;
use snap_llm::ChatModel;
use snap_state::BoardState;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::AppConfig;

/// Where the workflow currently is. Every step only moves forward; any
/// failure ends the run in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStage {
    AwaitingUserReady,
    Capturing,
    Slicing,
    Describing,
    Advising,
    Done,
    Failed {
        during: Box<WorkflowStage>,
        reason: String,
    },
}

impl WorkflowStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStage::Done | WorkflowStage::Failed { .. })
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStage::AwaitingUserReady => write!(f, "awaiting user"),
            WorkflowStage::Capturing => write!(f, "capturing"),
            WorkflowStage::Slicing => write!(f, "slicing"),
            WorkflowStage::Describing => write!(f, "describing"),
            WorkflowStage::Advising => write!(f, "advising"),
            WorkflowStage::Done => write!(f, "done"),
            WorkflowStage::Failed { during, .. } => write!(f, "failed while {}", during),
        }
    }
}

/// Artifacts handed from one step to the next
#[derive(Default)]
struct Progress {
    screenshot: Option<PathBuf>,
    state: Option<BoardState>,
}

/// Drives capture → slice → describe → advise for one board.
pub struct Workflow {
    config: AppConfig,
    model: Arc<dyn ChatModel>,
    capture: Arc<dyn BoardCapture>,
}

impl Workflow {
    pub fn new(config: AppConfig, model: Arc<dyn ChatModel>, capture: Arc<dyn BoardCapture>) -> Self {
        Self {
            config,
            model,
            capture,
        }
    }

    /// Run every step until the workflow is done or a step fails.
    ///
    /// Progress and the final advice go to `out`; `input` is read once for the
    /// user's go-ahead before capturing.
    pub async fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> WorkflowStage {
        let mut stage = WorkflowStage::AwaitingUserReady;
        let mut progress = Progress::default();

        while !stage.is_terminal() {
            info!("Workflow stage: {}", stage);
            stage = match self.step(&stage, &mut progress, input, out).await {
                Ok(next) => next,
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!("Workflow failed while {}: {}", stage, reason);
                    let _ = writeln!(out, "{}", diagnostic(&stage, &reason));
                    WorkflowStage::Failed {
                        during: Box::new(stage),
                        reason,
                    }
                }
            };
        }

        stage
    }

    async fn step<R: BufRead, W: Write>(
        &self,
        stage: &WorkflowStage,
        progress: &mut Progress,
        input: &mut R,
        out: &mut W,
    ) -> Result<WorkflowStage> {
        match stage {
            WorkflowStage::AwaitingUserReady => {
                writeln!(out, "Ensure Marvel Snap is running and clearly visible.")?;
                writeln!(
                    out,
                    "When prompted, use the crosshair to select the Marvel Snap window."
                )?;
                write!(out, "Press Enter when you're ready to capture the screenshot...")?;
                out.flush()?;

                let mut line = String::new();
                input.read_line(&mut line).context("Failed to read confirmation")?;
                Ok(WorkflowStage::Capturing)
            }
            WorkflowStage::Capturing => {
                writeln!(out, "Capturing screenshot...")?;
                let capture = Arc::clone(&self.capture);
                let target = self.config.screenshot_path();
                let screenshot = tokio::task::spawn_blocking(move || capture.capture(&target))
                    .await
                    .map_err(|e| anyhow!("Capture task failed: {}", e))??;

                writeln!(out, "Screenshot saved to {}", screenshot.display())?;
                progress.screenshot = Some(screenshot);
                Ok(WorkflowStage::Slicing)
            }
            WorkflowStage::Slicing => {
                writeln!(out, "Dividing screenshot into board sections...")?;
                let screenshot = progress
                    .screenshot
                    .clone()
                    .ok_or_else(|| anyhow!("No screenshot to divide"))?;
                let output_dir = self.config.project_root.clone();
                tokio::task::spawn_blocking(move || snap_capture::slice_board(&screenshot, &output_dir))
                    .await
                    .map_err(|e| anyhow!("Slice task failed: {}", e))??;
                Ok(WorkflowStage::Describing)
            }
            WorkflowStage::Describing => {
                writeln!(out, "Describing board state...")?;
                let started = Instant::now();
                let state = snap_vision::describe_all(
                    Arc::clone(&self.model),
                    self.config.project_root(),
                    &self.config.abilities_path(),
                    self.config.unknown_ability,
                )
                .await?;
                writeln!(
                    out,
                    "Descriptions retrieved in {:.2} seconds.",
                    started.elapsed().as_secs_f64()
                )?;
                progress.state = Some(state);
                Ok(WorkflowStage::Advising)
            }
            WorkflowStage::Advising => {
                writeln!(out, "Generating strategic advice...")?;
                let state = progress
                    .state
                    .as_ref()
                    .ok_or_else(|| anyhow!("No board state to advise on"))?;
                let abilities = CardAbilities::load(&self.config.abilities_path())?;
                let advice = snap_advisor::get_strategic_advice(
                    self.model.as_ref(),
                    state,
                    &abilities,
                    self.config.unknown_ability,
                    &self.config.advice_path(),
                )
                .await?;

                writeln!(out, "\nStrategic Advice:\n")?;
                writeln!(out, "{}", advice)?;
                Ok(WorkflowStage::Done)
            }
            WorkflowStage::Done | WorkflowStage::Failed { .. } => Ok(stage.clone()),
        }
    }
}

fn diagnostic(stage: &WorkflowStage, reason: &str) -> String {
    match stage {
        WorkflowStage::Capturing => {
            format!("Failed to capture screenshot: {}. Please try again.", reason)
        }
        WorkflowStage::Slicing => format!("Error dividing screenshot: {}", reason),
        WorkflowStage::Describing => format!("Error describing board state: {}", reason),
        WorkflowStage::Advising => format!("Error getting strategic advice: {}", reason),
        other => format!("Error while {}: {}", other, reason),
    }
}
