use std::collections::BTreeSet;
use std::path::Path;

use crate::{read_existing, CardAbilities, Result};

/// Load distinct card names from a newline-delimited roster file.
pub fn load_card_names(path: &Path) -> Result<BTreeSet<String>> {
    let content = read_existing(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Cards listed in the roster that have no entry in the ability file.
pub fn find_missing_cards(roster_path: &Path, abilities_path: &Path) -> Result<BTreeSet<String>> {
    let roster = load_card_names(roster_path)?;
    let abilities = CardAbilities::load(abilities_path)?;

    let missing: BTreeSet<String> = roster
        .into_iter()
        .filter(|name| !abilities.contains(name))
        .collect();

    tracing::debug!("{} roster card(s) missing an ability", missing.len());
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataError;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reports_cards_without_ability() {
        let dir = tempfile::tempdir().unwrap();
        let roster = write(dir.path(), "allcards.txt", "Iron Man\nHulk\nNova\n");
        let abilities = write(
            dir.path(),
            "card_abilities.txt",
            "Iron Man: Flies in.\nHulk: Smashes.",
        );

        let missing = find_missing_cards(&roster, &abilities).unwrap();
        assert_eq!(missing, BTreeSet::from(["Nova".to_string()]));
    }

    #[test]
    fn test_nothing_missing() {
        let dir = tempfile::tempdir().unwrap();
        let roster = write(dir.path(), "allcards.txt", "  Hulk  \n\n Iron Man\n");
        let abilities = write(
            dir.path(),
            "card_abilities.txt",
            "Iron Man: Flies in.\nHulk: Smashes.\nThor: Shuffles Mjolnir.",
        );

        assert!(find_missing_cards(&roster, &abilities).unwrap().is_empty());
    }

    #[test]
    fn test_injected_names_are_exactly_reported() {
        let dir = tempfile::tempdir().unwrap();
        let known = ["Iron Man", "Hulk", "Thor", "Odin", "Medusa"];
        let injected = ["Nova", "Squirrel Girl", "Ant Man"];

        let ability_text: String = known
            .iter()
            .map(|name| format!("{name}: Does something.\n"))
            .collect();
        let roster_text: String = known
            .iter()
            .chain(injected.iter())
            .map(|name| format!("{name}\n"))
            .collect();

        let roster = write(dir.path(), "allcards.txt", &roster_text);
        let abilities = write(dir.path(), "card_abilities.txt", &ability_text);

        let missing = find_missing_cards(&roster, &abilities).unwrap();
        let expected: BTreeSet<String> = injected.iter().map(|s| s.to_string()).collect();
        assert_eq!(missing, expected);
    }

    #[test]
    fn test_missing_roster_file() {
        let dir = tempfile::tempdir().unwrap();
        let abilities = write(dir.path(), "card_abilities.txt", "Hulk: Smashes.");
        let err = find_missing_cards(&dir.path().join("allcards.txt"), &abilities).unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }
}
