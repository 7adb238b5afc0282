use snap_capture::BoardRegion;

const HAND_PROMPT: &str = "List each card in the player's hand with its name. \
If there are no cards, state that the player has no cards in hand.";

const LEFT_LOCATION_PROMPT: &str = "What is the location name? Player cards are on the bottom, \
opponent cards are on top. For both the player and opponent, list all cards played at the left \
location with their names and abilities. If there are no cards, state that there are no cards at \
this location.";

const MIDDLE_LOCATION_PROMPT: &str = "What is the location name? Player cards are on the bottom, \
opponent cards are on top. For both the player and opponent, list all cards played at the middle \
location with their names and abilities. If there are no cards, state that there are no cards at \
this location.";

const RIGHT_LOCATION_PROMPT: &str = "What is the location name? Player cards are on the bottom, \
opponent cards are on top. For both the player and opponent, list all cards played at the right \
location with their names and abilities. If there are no cards, state that there are no cards at \
this location.";

const ENERGY_TURN_PROMPT: &str = "What is the current energy and turn number?";

/// Instruction sent to the vision model alongside a region's image
pub fn region_prompt(region: BoardRegion) -> &'static str {
    match region {
        BoardRegion::YourCards => HAND_PROMPT,
        BoardRegion::Location1 => LEFT_LOCATION_PROMPT,
        BoardRegion::Location2 => MIDDLE_LOCATION_PROMPT,
        BoardRegion::Location3 => RIGHT_LOCATION_PROMPT,
        BoardRegion::EnergyTurns => ENERGY_TURN_PROMPT,
    }
}

/// File the region's description is written to
pub fn description_file_name(region: BoardRegion) -> &'static str {
    match region {
        BoardRegion::YourCards => "hand.txt",
        BoardRegion::Location1 => "location1.txt",
        BoardRegion::Location2 => "location2.txt",
        BoardRegion::Location3 => "location3.txt",
        BoardRegion::EnergyTurns => "energyPower.txt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_location_prompts_name_their_side() {
        assert!(region_prompt(BoardRegion::Location1).contains("at the left location"));
        assert!(region_prompt(BoardRegion::Location2).contains("at the middle location"));
        assert!(region_prompt(BoardRegion::Location3).contains("at the right location"));
    }

    #[test]
    fn test_description_files_are_distinct() {
        let files: HashSet<_> = BoardRegion::ALL
            .iter()
            .map(|r| description_file_name(*r))
            .collect();
        assert_eq!(files.len(), BoardRegion::ALL.len());
    }
}
