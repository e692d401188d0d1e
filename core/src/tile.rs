//! Kitchen furniture and the grid that holds it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Buyable, CellCoord, Item, Pan};

/// Static classification of a tile, carrying its capability flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    /// Open floor.
    Floor,
    /// Impassable wall.
    Wall,
    /// Work surface holding one item.
    Counter,
    /// Storage holding a counted stack of identical items.
    Box,
    /// Sink where dirty plates are washed.
    Sink,
    /// Table receiving clean plates from a sink.
    #[serde(rename = "SINKTABLE")]
    SinkTable,
    /// Stove hosting a pan.
    Cooker,
    /// Bin that empties whatever a bot holds.
    Trash,
    /// Station where plates are submitted against orders.
    Submit,
    /// Store selling ingredients and equipment.
    Shop,
}

impl TileKind {
    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floor => "FLOOR",
            Self::Wall => "WALL",
            Self::Counter => "COUNTER",
            Self::Box => "BOX",
            Self::Sink => "SINK",
            Self::SinkTable => "SINKTABLE",
            Self::Cooker => "COOKER",
            Self::Trash => "TRASH",
            Self::Submit => "SUBMIT",
            Self::Shop => "SHOP",
        }
    }

    /// Stable numeric identifier used by map files.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Floor => 0,
            Self::Wall => 1,
            Self::Counter => 2,
            Self::Box => 3,
            Self::Sink => 4,
            Self::SinkTable => 5,
            Self::Cooker => 6,
            Self::Trash => 9,
            Self::Submit => 10,
            Self::Shop => 11,
        }
    }

    /// Bots may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Submit)
    }

    /// Standing next to the tile is hazardous. No current tile is.
    #[must_use]
    pub const fn is_dangerous(self) -> bool {
        false
    }

    /// Items can be put onto the tile.
    #[must_use]
    pub const fn is_placeable(self) -> bool {
        matches!(
            self,
            Self::Counter | Self::Box | Self::Sink | Self::Cooker | Self::Trash | Self::Submit
        )
    }

    /// The tile offers a dedicated interaction.
    #[must_use]
    pub const fn is_interactable(self) -> bool {
        matches!(
            self,
            Self::Box | Self::Sink | Self::SinkTable | Self::Cooker | Self::Submit | Self::Shop
        )
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A kitchen tile together with its mutable contents.
///
/// Tiles never move; only their slots and counters change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tile", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tile {
    /// Open floor.
    Floor,
    /// Impassable wall.
    Wall,
    /// Work surface holding at most one item.
    Counter {
        /// Item resting on the counter.
        #[serde(default)]
        item: Option<Item>,
    },
    /// Counted stack of signature-identical items.
    Box {
        /// Prototype of the stored items, `None` when empty.
        #[serde(default)]
        item: Option<Item>,
        /// Number of stored units.
        #[serde(default)]
        count: u32,
    },
    /// Sink where dirty plates wait to be washed.
    Sink {
        /// Dirty plates in the sink.
        #[serde(default)]
        dirty_plates: u32,
        /// Set by a wash action, consumed by the next tick.
        #[serde(default)]
        in_use: bool,
        /// Ticks accumulated toward washing the current plate.
        #[serde(default)]
        wash_progress: u32,
    },
    /// Stack of clean plates.
    #[serde(rename = "SINKTABLE")]
    SinkTable {
        /// Clean plates ready to be taken.
        #[serde(default)]
        clean_plates: u32,
    },
    /// Stove hosting at most one pan.
    Cooker {
        /// Pan on the stove.
        #[serde(default)]
        pan: Option<Pan>,
        /// Ticks the pan's food has cooked.
        #[serde(default)]
        cook_progress: u32,
    },
    /// Bin.
    Trash,
    /// Submission station.
    Submit,
    /// Store.
    Shop {
        /// Items this shop sells.
        #[serde(default = "Buyable::full_menu")]
        menu: Vec<Buyable>,
    },
}

impl Tile {
    /// Creates a tile of the given kind in its empty state.
    ///
    /// Shops get the full menu; cookers start without a pan.
    #[must_use]
    pub fn empty(kind: TileKind) -> Self {
        match kind {
            TileKind::Floor => Self::Floor,
            TileKind::Wall => Self::Wall,
            TileKind::Counter => Self::Counter { item: None },
            TileKind::Box => Self::Box {
                item: None,
                count: 0,
            },
            TileKind::Sink => Self::Sink {
                dirty_plates: 0,
                in_use: false,
                wash_progress: 0,
            },
            TileKind::SinkTable => Self::SinkTable { clean_plates: 0 },
            TileKind::Cooker => Self::Cooker {
                pan: None,
                cook_progress: 0,
            },
            TileKind::Trash => Self::Trash,
            TileKind::Submit => Self::Submit,
            TileKind::Shop => Self::Shop {
                menu: Buyable::full_menu(),
            },
        }
    }

    /// Static classification of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        match self {
            Self::Floor => TileKind::Floor,
            Self::Wall => TileKind::Wall,
            Self::Counter { .. } => TileKind::Counter,
            Self::Box { .. } => TileKind::Box,
            Self::Sink { .. } => TileKind::Sink,
            Self::SinkTable { .. } => TileKind::SinkTable,
            Self::Cooker { .. } => TileKind::Cooker,
            Self::Trash => TileKind::Trash,
            Self::Submit => TileKind::Submit,
            Self::Shop { .. } => TileKind::Shop,
        }
    }

    /// Bots may stand on the tile.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.kind().is_walkable()
    }

    /// The tile offers a dedicated interaction.
    #[must_use]
    pub const fn is_interactable(&self) -> bool {
        self.kind().is_interactable()
    }

    /// Items can be put onto the tile.
    #[must_use]
    pub const fn is_placeable(&self) -> bool {
        self.kind().is_placeable()
    }

    /// Item resting in the tile's single slot, if the tile has one.
    #[must_use]
    pub fn item(&self) -> Option<&Item> {
        match self {
            Self::Counter { item } | Self::Box { item, .. } => item.as_ref(),
            _ => None,
        }
    }
}

/// Rectangular kitchen grid stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl KitchenMap {
    /// Creates a kitchen of the given size covered in floor.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![Tile::Floor; capacity],
        }
    }

    /// Creates a kitchen from row-major tiles, or `None` when the count does not
    /// match the dimensions.
    #[must_use]
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> Option<Self> {
        let map = Self {
            width,
            height,
            tiles,
        };
        map.is_consistent().then_some(map)
    }

    /// Reports whether the tile count matches the dimensions.
    ///
    /// Deserialized maps must be checked before use.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        u64::try_from(self.tiles.len()).ok() == Some(u64::from(self.width) * u64::from(self.height))
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }

    /// Tile at `cell`, or `None` when out of bounds.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    /// Mutable tile at `cell`, or `None` when out of bounds.
    pub fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.index(cell).and_then(|index| self.tiles.get_mut(index))
    }

    /// Replaces the tile at `cell`. Returns `false` when out of bounds.
    pub fn set_tile(&mut self, cell: CellCoord, tile: Tile) -> bool {
        match self.tile_mut(cell) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Reports whether bots may stand on `cell`. Out-of-bounds cells are not walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(Tile::is_walkable)
    }

    /// Iterates over every cell with its tile, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &Tile)> {
        let width = self.width.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % width, index / width), tile)
        })
    }

    /// Iterates mutably over every cell with its tile, row by row.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = (CellCoord, &mut Tile)> {
        let width = self.width.max(1);
        self.tiles.iter_mut().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % width, index / width), tile)
        })
    }

    /// Cells holding tiles of the given kind, row by row.
    #[must_use]
    pub fn cells_of(&self, kind: TileKind) -> Vec<CellCoord> {
        self.cells()
            .filter(|(_, tile)| tile.kind() == kind)
            .map(|(cell, _)| cell)
            .collect()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.in_bounds(cell) {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
