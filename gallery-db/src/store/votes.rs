use gallery_msg::{Emoji, Reaction};
use itertools::Itertools;
use lazy_static::lazy_static;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteCategory {
    Fire,
    Neutral,
    Trash,
    Star,
}

lazy_static! {
    // Each category is reachable by its unicode form and by its textual code.
    static ref EMOJI_CATEGORIES: HashMap<&'static str, VoteCategory> = {
        let mut table = HashMap::new();
        table.insert("🔥", VoteCategory::Fire);
        table.insert("fire", VoteCategory::Fire);
        table.insert("😐", VoteCategory::Neutral);
        table.insert("neutral_face", VoteCategory::Neutral);
        table.insert("🗑️", VoteCategory::Trash);
        table.insert("🗑", VoteCategory::Trash);
        table.insert("wastebasket", VoteCategory::Trash);
        table.insert("⭐", VoteCategory::Star);
        table.insert("star", VoteCategory::Star);
        table
    };
}

/// Looks the emoji up by code first, then by name.
pub fn category_for(emoji: &Emoji) -> Option<VoteCategory> {
    emoji
        .code
        .as_deref()
        .and_then(|code| EMOJI_CATEGORIES.get(code))
        .or_else(|| EMOJI_CATEGORIES.get(emoji.name.as_str()))
        .copied()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Votes {
    #[serde(default)]
    pub fire: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub trash: u64,
    #[serde(default)]
    pub star: u64,
}

impl Votes {
    pub fn get(&self, category: VoteCategory) -> u64 {
        match category {
            VoteCategory::Fire => self.fire,
            VoteCategory::Neutral => self.neutral,
            VoteCategory::Trash => self.trash,
            VoteCategory::Star => self.star,
        }
    }

    pub fn add(&mut self, category: VoteCategory, count: u64) {
        match category {
            VoteCategory::Fire => self.fire += count,
            VoteCategory::Neutral => self.neutral += count,
            VoteCategory::Trash => self.trash += count,
            VoteCategory::Star => self.star += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.fire + self.neutral + self.trash + self.star
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub votes: Votes,
    pub voters: BTreeMap<String, VoteCategory>,
}

/// Turns a message's reactions into vote counts and a voter map.
///
/// Bot users never vote. A user listed under several matched reactions keeps
/// the category of the last one in reaction order, and is counted once, so the
/// counts always agree with the voter map.
pub fn aggregate_reactions(reactions: &[Reaction]) -> Tally {
    let mut voters: BTreeMap<String, VoteCategory> = BTreeMap::new();

    for reaction in reactions {
        let category = match category_for(&reaction.emoji) {
            Some(category) => category,
            None => continue,
        };
        for user in reaction.users.iter().filter(|user| !user.is_bot) {
            if let Some(previous) = voters.insert(user.id.clone(), category) {
                if previous != category {
                    trace!("voter {} moved from {:?} to {:?}", user.id, previous, category);
                }
            }
        }
    }

    let mut votes = Votes::default();
    for (category, count) in voters.values().counts() {
        votes.add(*category, count as u64);
    }

    Tally { votes, voters }
}
