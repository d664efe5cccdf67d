//! Seeded bot that spends resources on towers next to the path.

use path_defence_core::{TileCoord, TowerId};
use path_defence_engine::Session;
use path_defence_world::query;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Buys towers on random open tiles that cover part of the path.
#[derive(Debug)]
pub(crate) struct AutoBuyer {
    rng: ChaCha8Rng,
}

impl AutoBuyer {
    /// Creates a bot whose choices are fully determined by `seed`.
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Buys at most one tower. Returns `None` when broke or out of tiles.
    pub(crate) fn step(&mut self, session: &mut Session) -> Option<TowerId> {
        let world = session.world();
        let rules = query::rules(world);
        if query::resources(world) < rules.tower_cost {
            return None;
        }

        let path = query::path(world);
        let candidates: Vec<TileCoord> = query::open_tiles(world)
            .into_iter()
            .filter(|tile| path.distance_to(tile.center(rules.tile_length)) <= rules.tower_range)
            .collect();
        let tile = *candidates.choose(&mut self.rng)?;
        let center = tile.center(rules.tile_length);

        match session.buy_tower(center.x, center.y) {
            Ok(tower) => Some(tower),
            Err(error) => {
                warn!(%error, %tile, "auto-buy rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_engine::SessionConfig;

    fn session() -> Session {
        Session::new(SessionConfig::default()).expect("default session")
    }

    fn tiles(session: &Session) -> Vec<TileCoord> {
        query::tower_view(session.world())
            .iter()
            .map(|tower| tower.tile)
            .collect()
    }

    #[test]
    fn same_seed_buys_the_same_tiles() {
        let mut first = session();
        let mut second = session();
        let mut first_bot = AutoBuyer::new(7);
        let mut second_bot = AutoBuyer::new(7);

        for _ in 0..2 {
            let _ = first_bot.step(&mut first);
            let _ = second_bot.step(&mut second);
        }

        assert_eq!(tiles(&first).len(), 2);
        assert_eq!(tiles(&first), tiles(&second));
    }

    #[test]
    fn bought_towers_cover_the_path() {
        let mut session = session();
        let mut bot = AutoBuyer::new(42);
        let _ = bot.step(&mut session).expect("affordable");

        let world = session.world();
        let rules = query::rules(world);
        for tower in query::tower_view(world).iter() {
            assert!(query::path(world).distance_to(tower.center) <= rules.tower_range);
        }
    }

    #[test]
    fn stops_buying_when_broke() {
        let mut session = session();
        let mut bot = AutoBuyer::new(1);
        assert!(bot.step(&mut session).is_some());
        assert!(bot.step(&mut session).is_some());
        assert!(bot.step(&mut session).is_none());
        assert_eq!(session.labels().resources, 0);
    }
}
