use anyhow::{Context, Result};
use snap_data::CardAbilities;
use snap_llm::ChatModel;
use snap_state::{BoardState, UnknownAbility};
use std::path::Path;
use tracing::info;

/// File the advice is written to inside the project directory
pub const ADVICE_FILE: &str = "finalResponse.txt";

const GAME_STATE_SLOT: &str = "{game_state}";

const PROMPT_TEMPLATE: &str = "You are a Marvel Snap expert. Given the following game state:

{game_state}

Please analyze the game state and provide strategic advice in the following format:

Analysis:
1. [Analyze the current board state, including played cards and their abilities]
2. [Evaluate the hand cards and their potential impact]
3. [Consider the location effects and how they interact with the cards]
4. [Assess the opponent's likely strategy based on their played cards]

Energy: [current energy]

Recommended Moves:
1. [play/move] [card name] [left/middle/right]. [Card cost]/[Card power] [Card ability description]
2. (Additional moves if applicable)

Explanation: [Explain why these moves are the best options, considering the analysis above, synergies between card abilities, location effects, and the current game state]
";

/// Fill the advice template with the rendered board state.
pub fn render_advice_prompt(
    state: &BoardState,
    abilities: &CardAbilities,
    unknown: UnknownAbility,
) -> String {
    PROMPT_TEMPLATE.replacen(GAME_STATE_SLOT, &state.to_prompt(abilities, unknown), 1)
}

/// Request a strategic recommendation for `state`.
///
/// The reply is trimmed, written to `output_path` and returned as-is; its
/// structure is never checked.
pub async fn get_strategic_advice(
    model: &dyn ChatModel,
    state: &BoardState,
    abilities: &CardAbilities,
    unknown: UnknownAbility,
    output_path: &Path,
) -> Result<String> {
    let prompt = render_advice_prompt(state, abilities, unknown);

    let advice = model
        .complete(&prompt)
        .await
        .context("Advice request failed")?
        .trim()
        .to_string();

    tokio::fs::write(output_path, &advice)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!("Advice saved to {}", output_path.display());

    Ok(advice)
}
