use anyhow::{anyhow, Context, Result};
use snap_capture::BoardRegion;
use snap_data::CardAbilities;
use snap_llm::ChatModel;
use snap_state::{BoardState, UnknownAbility};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::prompts::{description_file_name, region_prompt};

/// Combined prompt written next to the region images for inspection
pub const BOARD_PROMPT_FILE: &str = "bigprompt.txt";

/// Per-region result of one describe pass.
///
/// Every region that was attempted has an entry, either its description or
/// the reason it failed.
#[derive(Debug, Default)]
pub struct RegionOutcomes {
    outcomes: BTreeMap<BoardRegion, Result<String>>,
}

impl RegionOutcomes {
    pub fn insert(&mut self, region: BoardRegion, outcome: Result<String>) {
        self.outcomes.insert(region, outcome);
    }

    pub fn get(&self, region: BoardRegion) -> Option<&Result<String>> {
        self.outcomes.get(&region)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successful descriptions in canonical region order.
    pub fn descriptions(&self) -> impl Iterator<Item = (BoardRegion, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(region, outcome)| outcome.as_ref().ok().map(|t| (*region, t.as_str())))
    }

    pub fn failures(&self) -> impl Iterator<Item = (BoardRegion, &anyhow::Error)> {
        self.outcomes
            .iter()
            .filter_map(|(region, outcome)| outcome.as_ref().err().map(|e| (*region, e)))
    }

    pub fn into_descriptions(self) -> impl Iterator<Item = (BoardRegion, String)> {
        self.outcomes
            .into_iter()
            .filter_map(|(region, outcome)| outcome.ok().map(|text| (region, text)))
    }
}

/// Ask the model to describe one cropped region and store the reply in the
/// region's description file.
pub async fn describe_region(
    model: &dyn ChatModel,
    image_dir: &Path,
    region: BoardRegion,
) -> Result<String> {
    let image_path = image_dir.join(region.image_file_name());
    let png = tokio::fs::read(&image_path)
        .await
        .with_context(|| format!("Failed to read {}", image_path.display()))?;

    let description = model
        .describe_image(region_prompt(region), &png)
        .await
        .with_context(|| format!("Vision request for {} failed", region))?
        .trim()
        .to_string();
    info!("Description for {}:\n{}", region, description);

    let output_path = image_dir.join(description_file_name(region));
    tokio::fs::write(&output_path, &description)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(description)
}

/// Describe all five regions concurrently, one task per region.
///
/// Tasks finish in any order; a failing region is logged and recorded in the
/// outcomes without affecting the others.
pub async fn describe_regions(model: Arc<dyn ChatModel>, image_dir: &Path) -> RegionOutcomes {
    let mut tasks = JoinSet::new();
    for region in BoardRegion::ALL {
        let model = Arc::clone(&model);
        let image_dir: PathBuf = image_dir.to_path_buf();
        tasks.spawn(async move {
            let outcome = describe_region(model.as_ref(), &image_dir, region).await;
            (region, outcome)
        });
    }

    let mut outcomes = RegionOutcomes::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((region, outcome)) => {
                if let Err(e) = &outcome {
                    warn!("{} generated an exception: {:#}", region, e);
                }
                outcomes.insert(region, outcome);
            }
            Err(e) => warn!("Describe task aborted: {}", e),
        }
    }

    // A panicked task leaves no result behind
    for region in BoardRegion::ALL {
        if outcomes.get(region).is_none() {
            outcomes.insert(region, Err(anyhow!("describe task for {} did not complete", region)));
        }
    }

    debug!(
        "Described {}/{} regions",
        outcomes.descriptions().count(),
        outcomes.len()
    );
    outcomes
}

/// Describe every saved region image and gather the known cards they mention.
///
/// Only a missing or malformed ability file is fatal; failed regions are left
/// out of the returned state. The combined prompt is written to
/// [`BOARD_PROMPT_FILE`] inside `image_dir`.
pub async fn describe_all(
    model: Arc<dyn ChatModel>,
    image_dir: &Path,
    abilities_path: &Path,
    unknown: UnknownAbility,
) -> Result<BoardState> {
    let abilities = CardAbilities::load(abilities_path)?;

    let outcomes = describe_regions(model, image_dir).await;
    let state = BoardState::from_descriptions(outcomes.into_descriptions(), &abilities);
    info!(
        "Board state has {} section(s), {} referenced card(s)",
        state.sections.len(),
        state.referenced_cards.len()
    );

    let prompt_path = image_dir.join(BOARD_PROMPT_FILE);
    tokio::fs::write(&prompt_path, state.to_prompt(&abilities, unknown))
        .await
        .with_context(|| format!("Failed to write {}", prompt_path.display()))?;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use snap_llm::LlmError;
    use std::collections::BTreeSet;
    use std::time::Duration;

    /// Replies per region prompt; regions listed in `failing` return an API error.
    /// Earlier regions answer last so completion order differs from board order.
    struct FakeVision {
        failing: Vec<BoardRegion>,
    }

    #[async_trait]
    impl ChatModel for FakeVision {
        async fn complete(&self, _prompt: &str) -> snap_llm::Result<String> {
            unreachable!("describer only sends image requests")
        }

        async fn describe_image(&self, prompt: &str, png: &[u8]) -> snap_llm::Result<String> {
            let (idx, region) = BoardRegion::ALL
                .iter()
                .enumerate()
                .find(|(_, r)| region_prompt(**r) == prompt)
                .expect("prompt belongs to a region");
            tokio::time::sleep(Duration::from_millis(10 * (5 - idx as u64))).await;

            if self.failing.contains(region) {
                return Err(LlmError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            let reply = match region {
                BoardRegion::YourCards => "Hand: Hulk, Nova",
                BoardRegion::Location1 => "Opponent played IRON MAN",
                BoardRegion::Location2 => "No cards at this location",
                BoardRegion::Location3 => "Player played Thor and Iron Man",
                BoardRegion::EnergyTurns => "Energy 3, turn 3",
            };
            Ok(format!("  {} ({} bytes)\n", reply, png.len()))
        }
    }

    fn board_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for region in BoardRegion::ALL {
            std::fs::write(dir.path().join(region.image_file_name()), b"fake png").unwrap();
        }
        std::fs::write(
            dir.path().join("card_abilities.txt"),
            "Iron Man: Flies in.\nHulk: Smashes.\nThor: Shuffles Mjolnir.\n",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_describe_all_regions() {
        let dir = board_dir();
        let model: Arc<dyn ChatModel> = Arc::new(FakeVision { failing: vec![] });

        let state = describe_all(
            model,
            dir.path(),
            &dir.path().join("card_abilities.txt"),
            UnknownAbility::Placeholder,
        )
        .await
        .unwrap();

        assert_eq!(state.sections.len(), 5);
        assert_eq!(
            state.sections[&BoardRegion::YourCards],
            "Hand: Hulk, Nova (8 bytes)"
        );
        assert_eq!(
            state.referenced_cards,
            BTreeSet::from(["Hulk".to_string(), "Iron Man".to_string(), "Thor".to_string()])
        );

        let hand = std::fs::read_to_string(dir.path().join("hand.txt")).unwrap();
        assert_eq!(hand, "Hand: Hulk, Nova (8 bytes)");
        let energy = std::fs::read_to_string(dir.path().join("energyPower.txt")).unwrap();
        assert_eq!(energy, "Energy 3, turn 3 (8 bytes)");

        let prompt = std::fs::read_to_string(dir.path().join(BOARD_PROMPT_FILE)).unwrap();
        let order: Vec<usize> = ["Your_cards:", "Location1:", "Location2:", "Location3:", "Energy_turns:"]
            .iter()
            .map(|label| prompt.find(label).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.ends_with(
            "Card Ability Reference:\nHulk: Smashes.\nIron Man: Flies in.\nThor: Shuffles Mjolnir."
        ));
    }

    #[tokio::test]
    async fn test_failed_region_is_omitted() {
        let dir = board_dir();
        let model: Arc<dyn ChatModel> = Arc::new(FakeVision {
            failing: vec![BoardRegion::Location3],
        });

        let state = describe_all(
            model,
            dir.path(),
            &dir.path().join("card_abilities.txt"),
            UnknownAbility::Placeholder,
        )
        .await
        .unwrap();

        assert_eq!(state.sections.len(), 4);
        assert!(!state.sections.contains_key(&BoardRegion::Location3));
        assert!(!dir.path().join("location3.txt").exists());
        // Thor was only mentioned in the failed region
        assert!(!state.referenced_cards.contains("Thor"));

        let prompt = std::fs::read_to_string(dir.path().join(BOARD_PROMPT_FILE)).unwrap();
        assert!(!prompt.contains("Location3:"));
    }

    #[tokio::test]
    async fn test_missing_image_is_a_region_failure() {
        let dir = board_dir();
        std::fs::remove_file(dir.path().join("energy_turns.png")).unwrap();
        let model: Arc<dyn ChatModel> = Arc::new(FakeVision { failing: vec![] });

        let outcomes = describe_regions(model, dir.path()).await;
        assert_eq!(outcomes.len(), 5);
        let failed: Vec<BoardRegion> = outcomes.failures().map(|(r, _)| r).collect();
        assert_eq!(failed, vec![BoardRegion::EnergyTurns]);

        let described: Vec<BoardRegion> = outcomes.descriptions().map(|(r, _)| r).collect();
        assert_eq!(described, BoardRegion::ALL[..4].to_vec());
    }

    #[tokio::test]
    async fn test_missing_abilities_is_fatal() {
        let dir = board_dir();
        let model: Arc<dyn ChatModel> = Arc::new(FakeVision { failing: vec![] });

        let result = describe_all(
            model,
            dir.path(),
            &dir.path().join("nope.txt"),
            UnknownAbility::Placeholder,
        )
        .await;
        assert!(result.is_err());
    }
}
