//! One-shot mid-match teleport of a team onto the opponent's kitchen.

use cookoff_core::{ActionError, BotId, CellCoord, Team};

use crate::World;

impl World {
    /// Moves every bot of `team` onto the opponent's kitchen.
    ///
    /// Bots take the opponent's spawn cells in order, skipping occupied ones, and fall back
    /// to the nearest free walkable cell around their current position, clamped into the
    /// opponent's kitchen. Either every bot is placed or nothing changes.
    pub(crate) fn request_switch(&mut self, team: Team) -> Result<(), ActionError> {
        if !self.rules.switch_window_open(self.turn) {
            return Err(ActionError::SwitchWindowClosed);
        }
        if *self.switched.get(team) {
            return Err(ActionError::AlreadySwitched);
        }

        let destination = team.opponent();
        let placements = self.plan_switch(team, destination)?;

        for (bot_id, cell) in placements {
            let Some(bot) = self.bots.get_mut(&bot_id) else {
                continue;
            };
            self.kitchens
                .get_mut(bot.map_team)
                .occupancy
                .vacate(bot.cell);
            self.kitchens
                .get_mut(destination)
                .occupancy
                .occupy(bot_id, cell);
            bot.map_team = destination;
            bot.cell = cell;
        }
        *self.switched.get_mut(team) = true;
        Ok(())
    }

    fn plan_switch(
        &self,
        team: Team,
        destination: Team,
    ) -> Result<Vec<(BotId, CellCoord)>, ActionError> {
        let kitchen = self.kitchens.get(destination);
        let mut claimed: Vec<CellCoord> = Vec::new();
        let mut placements = Vec::new();
        let travellers = self
            .bots
            .values()
            .filter(|bot| bot.team == team && bot.map_team != destination);

        for bot in travellers {
            let unclaimed = |cell: CellCoord| !claimed.contains(&cell);
            let cell = self
                .spawns
                .get(destination)
                .iter()
                .copied()
                .find(|cell| kitchen.is_free(*cell) && unclaimed(*cell))
                .or_else(|| kitchen.nearest_free(bot.cell, unclaimed))
                .ok_or(ActionError::NoSpawnCell)?;
            claimed.push(cell);
            placements.push((bot.id, cell));
        }
        Ok(placements)
    }
}
