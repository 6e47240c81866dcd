//! Display-name generation
//!
//! Every connection gets a name that is unique for the life of the process.
//! Names are never reused, even after their owner disconnects.

use std::collections::HashSet;

use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "Brave", "Calm", "Clever", "Eager", "Gentle", "Happy", "Jolly", "Kind", "Lively", "Lucky",
    "Mighty", "Nimble", "Proud", "Quick", "Quiet", "Swift", "Witty", "Zesty",
];

const ANIMALS: &[&str] = &[
    "Badger", "Beaver", "Crane", "Falcon", "Ferret", "Fox", "Heron", "Koala", "Lynx", "Moose",
    "Otter", "Owl", "Panda", "Puffin", "Raven", "Seal", "Tiger", "Wombat",
];

/// Issues unique display names
#[derive(Debug, Default)]
pub struct NameGenerator {
    issued: HashSet<String>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a name that has never been returned before
    pub fn next_name(&mut self) -> String {
        let mut rng = rand::thread_rng();
        let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Anonymous");
        let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("Guest");
        let base = format!("{}{}", adjective, animal);

        let mut candidate = base.clone();
        let mut suffix = 1u32;
        while self.issued.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}{}", base, suffix);
        }

        self.issued.insert(candidate.clone());
        candidate
    }
}
