//! Compact kitchen builders for tests and demos.
//!
//! Kitchens are drawn with one glyph per cell:
//!
//! | Glyph | Tile |
//! |---|---|
//! | `.` | floor |
//! | `#` | wall |
//! | `C` | counter |
//! | `B` | empty box |
//! | `S` | sink |
//! | `T` | sink table |
//! | `K` | cooker with an empty pan |
//! | `k` | cooker without a pan |
//! | `X` | trash |
//! | `U` | submit station |
//! | `$` | shop with the full menu |
//!
//! Unknown glyphs and the cells missing from short rows become walls.

use cookoff_core::{CellCoord, FoodType, KitchenMap, Order, OrderId, Pan, Tile, TileKind};

use crate::{MatchSetup, TeamSetup};

/// Builds a kitchen from glyph rows.
///
/// # Panics
///
/// Panics when the grid is too large to address with `u32` coordinates.
#[must_use]
pub fn kitchen(rows: &[&str]) -> KitchenMap {
    let width = rows
        .iter()
        .map(|row| row.chars().count())
        .max()
        .unwrap_or(0);
    let tiles = rows
        .iter()
        .flat_map(|row| {
            let mut glyphs = row.chars();
            (0..width).map(move |_| glyphs.next().map_or(Tile::Wall, tile_for))
        })
        .collect();
    let width = u32::try_from(width).expect("kitchen width fits in u32");
    let height = u32::try_from(rows.len()).expect("kitchen height fits in u32");
    KitchenMap::from_tiles(width, height, tiles).expect("glyph rows fill the whole grid")
}

fn tile_for(glyph: char) -> Tile {
    match glyph {
        '.' => Tile::Floor,
        'C' => Tile::empty(TileKind::Counter),
        'B' => Tile::empty(TileKind::Box),
        'S' => Tile::empty(TileKind::Sink),
        'T' => Tile::empty(TileKind::SinkTable),
        'K' => Tile::Cooker {
            pan: Some(Pan::empty()),
            cook_progress: 0,
        },
        'k' => Tile::empty(TileKind::Cooker),
        'X' => Tile::Trash,
        'U' => Tile::Submit,
        '$' => Tile::empty(TileKind::Shop),
        _ => Tile::Wall,
    }
}

/// Creates an order active from `created_turn` until just before `expires_turn`.
#[must_use]
pub fn order(
    id: u32,
    required: &[FoodType],
    created_turn: u32,
    expires_turn: u32,
    reward: i64,
) -> Order {
    Order {
        id: OrderId::new(id),
        required: required.to_vec(),
        created_turn,
        expires_turn,
        reward,
        penalty: 0,
        claimed_by: None,
        completed_turn: None,
        expired: false,
    }
}

/// Mirrored setup where both teams share the same kitchen layout and spawns.
#[must_use]
pub fn mirrored_setup(rows: &[&str], spawns: &[CellCoord]) -> MatchSetup {
    let team = TeamSetup {
        map: kitchen(rows),
        orders: Vec::new(),
        spawns: spawns.to_vec(),
    };
    MatchSetup {
        red: team.clone(),
        blue: team,
        switch_turn: None,
        switch_duration: None,
    }
}

/// Small but complete kitchen with every tile kind, two bots per team and a few orders.
#[must_use]
pub fn demo_setup() -> MatchSetup {
    const ROWS: [&str; 6] = [
        "##########",
        "#$..C..KX#",
        "#B......U#",
        "#C..##..S#",
        "#k......T#",
        "##########",
    ];
    let spawns = [CellCoord::new(2, 2), CellCoord::new(6, 4)];
    let mut setup = mirrored_setup(&ROWS, &spawns);
    for (team, offset) in [(&mut setup.red, 0), (&mut setup.blue, 100)] {
        let stocked = team
            .map
            .set_tile(CellCoord::new(8, 4), Tile::SinkTable { clean_plates: 2 });
        assert!(stocked, "demo sink table lies inside the kitchen");
        team.orders = vec![
            order(
                offset + 1,
                &[FoodType::Noodles, FoodType::Sauce],
                1,
                120,
                90,
            ),
            order(offset + 2, &[FoodType::Egg], 20, 200, 60),
            order(
                offset + 3,
                &[FoodType::Meat, FoodType::Onions],
                150,
                400,
                200,
            ),
        ];
    }
    setup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_map_to_tiles() {
        let map = kitchen(&[".#C", "K$"]);
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(
            map.tile(CellCoord::new(2, 0)).map(Tile::kind),
            Some(TileKind::Counter)
        );
        assert_eq!(
            map.tile(CellCoord::new(1, 1)).map(Tile::kind),
            Some(TileKind::Shop)
        );
        assert_eq!(
            map.tile(CellCoord::new(2, 1)).map(Tile::kind),
            Some(TileKind::Wall),
            "short rows are padded with walls"
        );
    }

    #[test]
    fn ragged_rows_fill_a_rectangular_grid() {
        let map = kitchen(&["C", "...", ""]);
        assert!(map.is_consistent());
        assert_eq!(map.cells().count(), 9);
        assert_eq!(
            map.tile(CellCoord::new(0, 2)).map(Tile::kind),
            Some(TileKind::Wall)
        );
    }

    #[test]
    fn demo_setup_stocks_the_sink_table() {
        let setup = demo_setup();
        assert_eq!(
            setup.red.map.tile(CellCoord::new(8, 4)),
            Some(&Tile::SinkTable { clean_plates: 2 })
        );
    }

    #[test]
    fn demo_setup_has_unique_order_ids() {
        let setup = demo_setup();
        let mut ids: Vec<u32> = setup
            .red
            .orders
            .iter()
            .chain(setup.blue.orders.iter())
            .map(|order| order.id.get())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
