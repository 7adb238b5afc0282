mod describer;
pub mod prompts;

pub use describer::{describe_all, describe_region, describe_regions, RegionOutcomes, BOARD_PROMPT_FILE};
pub use prompts::{description_file_name, region_prompt};
