//! Lists roster cards that have no entry in the ability reference file.
//! Usage: cargo run -p snap-data --features cli --bin find_missing_cards -- [allcards.txt] [card_abilities.txt]

use std::path::PathBuf;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let roster = PathBuf::from(args.get(1).map(String::as_str).unwrap_or("allcards.txt"));
    let abilities = PathBuf::from(
        args.get(2)
            .map(String::as_str)
            .unwrap_or("card_abilities.txt"),
    );

    let missing = match snap_data::find_missing_cards(&roster, &abilities) {
        Ok(missing) => missing,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if missing.is_empty() {
        println!("No missing cards found.");
    } else {
        println!("Missing cards:");
        for card in &missing {
            println!("{}", card);
        }
    }
}
