//! Derived per-kitchen state such as bot occupancy and spawn search.

use std::collections::BTreeMap;

use cookoff_core::{BotId, CellCoord, KitchenMap, TileKind};

/// One team's home kitchen together with its derived indices.
#[derive(Clone, Debug)]
pub(crate) struct Kitchen {
    pub(crate) map: KitchenMap,
    pub(crate) occupancy: OccupancyGrid,
    sink_tables: BTreeMap<CellCoord, CellCoord>,
}

impl Kitchen {
    pub(crate) fn new(map: KitchenMap) -> Self {
        let occupancy = OccupancyGrid::new(map.width(), map.height());
        let sink_tables = pair_sinks(&map);
        Self {
            map,
            occupancy,
            sink_tables,
        }
    }

    /// Sink table receiving the plates washed in `sink`.
    pub(crate) fn sink_table(&self, sink: CellCoord) -> Option<CellCoord> {
        self.sink_tables.get(&sink).copied()
    }

    pub(crate) fn is_free(&self, cell: CellCoord) -> bool {
        self.map.is_walkable(cell) && self.occupancy.can_enter(cell)
    }

    /// Nearest walkable cell to `origin` accepted by `accept`, scanning rings of growing
    /// Chebyshev radius up to `max_radius`, column by column within each ring.
    ///
    /// An origin outside the grid is first clamped onto its nearest edge.
    pub(crate) fn nearest_walkable(
        &self,
        origin: CellCoord,
        max_radius: u32,
        accept: impl Fn(CellCoord) -> bool,
    ) -> Option<CellCoord> {
        let origin = self.clamp(origin)?;
        let reach = i64::from(max_radius);
        for radius in 0..=reach {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let Some(cell) = shifted(origin, dx, dy) else {
                        continue;
                    };
                    if self.map.is_walkable(cell) && accept(cell) {
                        return Some(cell);
                    }
                }
            }
        }
        None
    }

    /// Nearest free walkable cell accepted by `accept`, searching the whole kitchen.
    pub(crate) fn nearest_free(
        &self,
        origin: CellCoord,
        accept: impl Fn(CellCoord) -> bool,
    ) -> Option<CellCoord> {
        let reach = self.map.width().max(self.map.height());
        self.nearest_walkable(origin, reach, |cell| self.is_free(cell) && accept(cell))
    }

    /// Centermost walkable cell, used when a team supplies no spawn cells.
    ///
    /// Rings around the centre are searched up to the shorter side of the kitchen; past
    /// that the first walkable cell in row-major order wins.
    pub(crate) fn default_spawn(&self) -> Option<CellCoord> {
        let centre = CellCoord::new(self.map.width() / 2, self.map.height() / 2);
        let reach = self.map.width().min(self.map.height()).saturating_sub(1);
        self.nearest_walkable(centre, reach, |_| true).or_else(|| {
            self.map
                .cells()
                .map(|(cell, _)| cell)
                .find(|cell| self.map.is_walkable(*cell))
        })
    }

    fn clamp(&self, cell: CellCoord) -> Option<CellCoord> {
        let last_x = self.map.width().checked_sub(1)?;
        let last_y = self.map.height().checked_sub(1)?;
        Some(CellCoord::new(cell.x().min(last_x), cell.y().min(last_y)))
    }
}

fn shifted(origin: CellCoord, dx: i64, dy: i64) -> Option<CellCoord> {
    let x = u32::try_from(i64::from(origin.x()) + dx).ok()?;
    let y = u32::try_from(i64::from(origin.y()) + dy).ok()?;
    Some(CellCoord::new(x, y))
}

/// Pairs every sink with the nearest sink table, ties broken row-major.
fn pair_sinks(map: &KitchenMap) -> BTreeMap<CellCoord, CellCoord> {
    let tables = map.cells_of(TileKind::SinkTable);
    map.cells_of(TileKind::Sink)
        .into_iter()
        .filter_map(|sink| {
            tables
                .iter()
                .copied()
                .min_by_key(|table| (sink.chebyshev_distance(*table), table.y(), table.x()))
                .map(|table| (sink, table))
        })
        .collect()
}

/// Dense per-cell index of the bot standing on each cell.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<BotId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) fn can_enter(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_none()
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<BotId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .flatten()
    }

    pub(crate) fn occupy(&mut self, bot: BotId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(bot);
            }
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.columns && cell.y() < self.rows {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
