//! Monitoring categories. Each owns one log stream and an independent
//! partition of snapshot and dedup state.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Player,
    Enemies,
    Items,
    WorldObjects,
    Structure,
    System,
    Miscellaneous,
}

impl Category {
    pub fn all() -> impl Iterator<Item = Category> {
        Category::iter()
    }

    /// File name of the category's log inside the log directory
    pub fn log_file_name(&self) -> &'static str {
        match self {
            Self::Player => "player_log.txt",
            Self::Enemies => "enemies_log.txt",
            Self::Items => "items_log.txt",
            Self::WorldObjects => "world_objects_log.txt",
            Self::Structure => "structure_log.txt",
            Self::System => "system_log.txt",
            Self::Miscellaneous => "misc_log.txt",
        }
    }
}
