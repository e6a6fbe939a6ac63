//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use siege_grid_core::{CellCoord, ProjectilePayload, TowerId, TowerKind, TowerSnapshot};

/// Tower stored inside the world, with stats copied from the kind's table.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) fire_rate: f32,
    pub(crate) last_fired: f32,
    pub(crate) cost: u32,
}

impl TowerState {
    fn new(id: TowerId, kind: TowerKind, cell: CellCoord) -> Self {
        let stats = kind.stats();
        let weapon = stats.weapon;
        Self {
            id,
            kind,
            cell,
            range: weapon.map_or(0.0, |weapon| weapon.range),
            damage: weapon.map_or(0.0, |weapon| weapon.damage),
            fire_rate: weapon.map_or(0.0, |weapon| weapon.fire_rate),
            last_fired: 0.0,
            cost: stats.cost,
        }
    }

    /// Impact behaviour of projectiles fired by this tower.
    pub(crate) fn payload(&self) -> Option<ProjectilePayload> {
        self.kind.stats().weapon.map(|weapon| weapon.payload)
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            range: self.range,
            damage: self.damage,
            fire_rate: self.fire_rate,
            last_fired: self.last_fired,
            cost: self.cost,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its freshly allocated identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, TowerState::new(id, kind, cell));
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Towers in placement order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    pub(crate) fn deployed_dps(&self) -> f32 {
        self.iter()
            .filter_map(|tower| tower.kind.stats().weapon)
            .map(|weapon| weapon.damage_per_second())
            .sum()
    }
}
