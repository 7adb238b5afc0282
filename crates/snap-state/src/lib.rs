use snap_capture::BoardRegion;
use snap_data::CardAbilities;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Text rendered for a referenced card that has no entry in the ability map
pub const UNKNOWN_ABILITY_PLACEHOLDER: &str = "Ability unknown";

/// How [`BoardState::to_prompt`] renders a referenced card with no known ability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownAbility {
    /// `Name: Ability unknown`
    #[default]
    Placeholder,
    /// Leave the card out of the reference block
    Omit,
}

impl FromStr for UnknownAbility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(UnknownAbility::Placeholder),
            "omit" => Ok(UnknownAbility::Omit),
            other => Err(format!(
                "unknown ability policy '{}', expected 'placeholder' or 'omit'",
                other
            )),
        }
    }
}

/// Board description aggregated from the per-region model replies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Keyed by region, so iteration follows the canonical board order
    pub sections: BTreeMap<BoardRegion, String>,
    pub referenced_cards: BTreeSet<String>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from whichever regions were described and detect the
    /// known cards mentioned in them.
    pub fn from_descriptions<I>(descriptions: I, abilities: &CardAbilities) -> Self
    where
        I: IntoIterator<Item = (BoardRegion, String)>,
    {
        let sections: BTreeMap<BoardRegion, String> = descriptions.into_iter().collect();

        let mut referenced_cards = BTreeSet::new();
        for text in sections.values() {
            referenced_cards.extend(extract_known_cards(text, abilities.names()));
        }

        Self {
            sections,
            referenced_cards,
        }
    }

    /// Render the state as a prompt section.
    ///
    /// ```text
    /// Current game state:
    /// Your_cards:
    /// <description>
    /// Location1:
    /// <description>
    /// Card Ability Reference:
    /// Hulk: Smashes.
    /// ```
    pub fn to_prompt(&self, abilities: &CardAbilities, unknown: UnknownAbility) -> String {
        let sections_text = self
            .sections
            .iter()
            .map(|(region, text)| format!("{}:\n{}", region_label(*region), text))
            .collect::<Vec<_>>()
            .join("\n");

        let ability_lines: Vec<String> = self
            .referenced_cards
            .iter()
            .filter_map(|card| match (abilities.get(card), unknown) {
                (Some(ability), _) => Some(format!("{}: {}", card, ability)),
                (None, UnknownAbility::Placeholder) => {
                    Some(format!("{}: {}", card, UNKNOWN_ABILITY_PLACEHOLDER))
                }
                (None, UnknownAbility::Omit) => None,
            })
            .collect();

        let ability_text = if ability_lines.is_empty() {
            String::new()
        } else {
            format!("Card Ability Reference:\n{}", ability_lines.join("\n"))
        };

        ["Current game state:", sections_text.trim(), ability_text.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// Region name with its first letter capitalised and the rest lowercased,
/// e.g. `Your_cards`.
pub fn region_label(region: BoardRegion) -> String {
    let name = region.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Known card names that appear in `text`, compared case-insensitively.
pub fn extract_known_cards<'a, I>(text: &str, card_names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lowered = text.to_lowercase();
    card_names
        .into_iter()
        .filter(|card| lowered.contains(&card.to_lowercase()))
        .map(str::to_string)
        .collect()
}
