//! Environmental tick run once at the top of every turn.

use cookoff_core::{CellCoord, Event, Team, Tile};
use tracing::debug;

use crate::{
    actions::{advanced_stage, cooking_food},
    World,
};

impl World {
    /// Advances the turn counter, then credits income, cooks, washes and expires orders.
    pub(crate) fn start_turn(&mut self, out_events: &mut Vec<Event>) {
        self.turn = self.turn.saturating_add(1);
        out_events.push(Event::TurnStarted { turn: self.turn });

        for team in Team::TURN_ORDER {
            *self.money.get_mut(team) += self.rules.money_per_turn;
        }
        for map in Team::TURN_ORDER {
            self.advance_cookers(map, out_events);
            self.advance_sinks(map, out_events);
        }
        self.expire_orders(out_events);
    }

    fn advance_cookers(&mut self, map: Team, out_events: &mut Vec<Event>) {
        let rules = &self.rules;
        let kitchen = self.kitchens.get_mut(map);
        for (cell, tile) in kitchen.map.cells_mut() {
            let Tile::Cooker {
                pan: Some(pan),
                cook_progress,
            } = tile
            else {
                continue;
            };
            let Some(food) = cooking_food(pan) else {
                continue;
            };
            let progress = cook_progress.saturating_add(1);
            let stage = advanced_stage(food, progress, rules);
            let kind = food.kind;
            let changed = stage != food.cooked_stage;
            *cook_progress = progress;
            if let Some(food) = pan.food.as_mut() {
                food.cooked_stage = stage;
            }
            if changed {
                debug!(%map, %cell, food = kind.name(), ?stage, "food advanced a cooking stage");
                out_events.push(Event::FoodCooked {
                    map,
                    cell,
                    food: kind,
                    stage,
                });
            }
        }
    }

    fn advance_sinks(&mut self, map: Team, out_events: &mut Vec<Event>) {
        let threshold = self.rules.plate_wash_progress;
        let kitchen = self.kitchens.get_mut(map);
        let mut washed: Vec<CellCoord> = Vec::new();
        for (cell, tile) in kitchen.map.cells_mut() {
            let Tile::Sink {
                dirty_plates,
                in_use,
                wash_progress,
            } = tile
            else {
                continue;
            };
            if std::mem::take(in_use) && *dirty_plates > 0 {
                *wash_progress = wash_progress.saturating_add(1);
                if *wash_progress >= threshold {
                    washed.push(cell);
                }
            }
        }

        for sink in washed {
            let Some(table) = kitchen.sink_table(sink) else {
                continue;
            };
            if let Some(Tile::Sink {
                dirty_plates,
                wash_progress,
                ..
            }) = kitchen.map.tile_mut(sink)
            {
                *dirty_plates -= 1;
                *wash_progress = 0;
            }
            if let Some(Tile::SinkTable { clean_plates }) = kitchen.map.tile_mut(table) {
                *clean_plates += 1;
            }
            debug!(%map, %sink, %table, "plate washed");
            out_events.push(Event::PlateWashed { map, sink, table });
        }
    }
}
