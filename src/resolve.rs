//! Display unit labels for roster rows.
//!
//! The live `user -> unit` chain wins over the label cached on the
//! participant, which goes stale when a unit is renamed.

use std::collections::HashMap;

use crate::model::{Participant, UnitRecord, UserRecord};

/// Resolve the unit label for `participant`:
/// 1. when the participant's user has a `unit_id`, the unit it names, or the
///    cached label unchanged if that unit is gone;
/// 2. otherwise a unit whose name equals the cached label exactly;
/// 3. otherwise the cached label itself (empty when absent).
pub fn resolve_unit_label(
    participant: &Participant,
    users: &[UserRecord],
    units: &[UnitRecord],
) -> String {
    let live_unit_id = users
        .iter()
        .find(|u| u.id == participant.user_id)
        .and_then(|u| linked_unit(u.unit_id.as_deref()));
    label_with(
        participant,
        live_unit_id,
        |id| units.iter().find(|unit| unit.id == id),
        |name| units.iter().find(|unit| unit.name == name),
    )
}

fn linked_unit(unit_id: Option<&str>) -> Option<&str> {
    unit_id.filter(|id| !id.is_empty())
}

fn label_with<'u>(
    participant: &Participant,
    live_unit_id: Option<&str>,
    by_id: impl FnOnce(&str) -> Option<&'u UnitRecord>,
    by_name: impl FnOnce(&str) -> Option<&'u UnitRecord>,
) -> String {
    let cached = participant.cached_unit_label.as_deref().unwrap_or("");
    let unit = match live_unit_id {
        Some(id) => by_id(id),
        None if !cached.is_empty() => by_name(cached),
        None => None,
    };
    match unit {
        Some(unit) => unit.display_label().to_string(),
        None => cached.to_string(),
    }
}

/// Users and units indexed once per render. Lookups give the same answers
/// as [`resolve_unit_label`] when ids are unique; on duplicate ids the first
/// record wins, as with a linear scan.
pub struct Directory<'a> {
    user_units: HashMap<&'a str, Option<&'a str>>,
    units_by_id: HashMap<&'a str, &'a UnitRecord>,
    units_by_name: HashMap<&'a str, &'a UnitRecord>,
}

impl<'a> Directory<'a> {
    pub fn new(users: &'a [UserRecord], units: &'a [UnitRecord]) -> Self {
        let mut user_units = HashMap::with_capacity(users.len());
        for user in users {
            user_units
                .entry(user.id.as_str())
                .or_insert(user.unit_id.as_deref());
        }
        let mut units_by_id = HashMap::with_capacity(units.len());
        let mut units_by_name = HashMap::with_capacity(units.len());
        for unit in units {
            units_by_id.entry(unit.id.as_str()).or_insert(unit);
            units_by_name.entry(unit.name.as_str()).or_insert(unit);
        }
        Self {
            user_units,
            units_by_id,
            units_by_name,
        }
    }

    pub fn unit_label(&self, participant: &Participant) -> String {
        let live_unit_id = self
            .user_units
            .get(participant.user_id.as_str())
            .and_then(|unit_id| linked_unit(*unit_id));
        label_with(
            participant,
            live_unit_id,
            |id| self.units_by_id.get(id).copied(),
            |name| self.units_by_name.get(name).copied(),
        )
    }
}
