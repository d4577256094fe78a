//! Block kinds, fragment currencies, and the static balance tables.

pub mod data;

pub use data::{
    block_descriptors_for_floor, is_vault_floor, spawn_rates_for_floor, vault_kind_for_floor,
    BlockDescriptor,
};

use crate::core::constants::{NUM_BLOCK_KINDS, NUM_FRAGMENT_KINDS};
use serde::{Deserialize, Serialize};

/// A minable block kind. Dirt is filler and yields nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Dirt,
    Stone,
    Amber,
    Quartz,
    Obsidian,
}

impl BlockKind {
    pub fn all() -> [BlockKind; NUM_BLOCK_KINDS] {
        [
            BlockKind::Dirt,
            BlockKind::Stone,
            BlockKind::Amber,
            BlockKind::Quartz,
            BlockKind::Obsidian,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            BlockKind::Dirt => 0,
            BlockKind::Stone => 1,
            BlockKind::Amber => 2,
            BlockKind::Quartz => 3,
            BlockKind::Obsidian => 4,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BlockKind::Dirt => "Dirt",
            BlockKind::Stone => "Stone",
            BlockKind::Amber => "Amber",
            BlockKind::Quartz => "Quartz",
            BlockKind::Obsidian => "Obsidian",
        }
    }

    /// The fragment currency this kind drops, if any.
    pub fn fragment(&self) -> Option<FragmentKind> {
        match self {
            BlockKind::Dirt => None,
            BlockKind::Stone => Some(FragmentKind::Stone),
            BlockKind::Amber => Some(FragmentKind::Amber),
            BlockKind::Quartz => Some(FragmentKind::Quartz),
            BlockKind::Obsidian => Some(FragmentKind::Obsidian),
        }
    }

    pub fn is_filler(&self) -> bool {
        matches!(self, BlockKind::Dirt)
    }
}

/// Fragment currencies, one per non-filler block kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Stone,
    Amber,
    Quartz,
    Obsidian,
}

impl FragmentKind {
    pub fn all() -> [FragmentKind; NUM_FRAGMENT_KINDS] {
        [
            FragmentKind::Stone,
            FragmentKind::Amber,
            FragmentKind::Quartz,
            FragmentKind::Obsidian,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            FragmentKind::Stone => 0,
            FragmentKind::Amber => 1,
            FragmentKind::Quartz => 2,
            FragmentKind::Obsidian => 3,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FragmentKind::Stone => "Stone",
            FragmentKind::Amber => "Amber",
            FragmentKind::Quartz => "Quartz",
            FragmentKind::Obsidian => "Obsidian",
        }
    }

    pub fn block(&self) -> BlockKind {
        match self {
            FragmentKind::Stone => BlockKind::Stone,
            FragmentKind::Amber => BlockKind::Amber,
            FragmentKind::Quartz => BlockKind::Quartz,
            FragmentKind::Obsidian => BlockKind::Obsidian,
        }
    }
}
