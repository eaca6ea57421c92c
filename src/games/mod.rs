//! The arcade's mini-games
//!
//! Each game is a `Game` implementation: its own entity kinds, tuning
//! tables and drawing. Loop, scoring and persistence come from the engine.

pub mod aisle_walk;
pub mod cat_swat;
pub mod egg_catch;
pub mod runner;

pub use aisle_walk::AisleWalk;
pub use cat_swat::CatSwat;
pub use egg_catch::EggCatch;
pub use runner::DogRun;

/// Storage ids of every game, in menu order
pub const GAME_IDS: [&str; 4] = [
    runner::GAME_ID,
    egg_catch::GAME_ID,
    cat_swat::GAME_ID,
    aisle_walk::GAME_ID,
];

/// Whether `id` names one of the arcade's games
pub fn is_known(id: &str) -> bool {
    GAME_IDS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids = GAME_IDS.to_vec();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), GAME_IDS.len());
        assert!(is_known("dogRun"));
        assert!(!is_known("towerDefense"));
    }
}
