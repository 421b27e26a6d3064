//! Which combo the board is showing
//!
//! A selection survives refreshes for as long as its combo still has laps in
//! the current week. When it disappears, the board falls back to the busiest
//! combo.

use crate::domain::combo::{Combo, ComboKey};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No combo named {0} has laps this week")]
    UnknownCombo(ComboKey),
}

/// Selection state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "combo", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(ComboKey),
}

impl Selection {
    pub fn key(&self) -> Option<&ComboKey> {
        match self {
            Selection::NoSelection => None,
            Selection::Selected(key) => Some(key),
        }
    }

    /// Transition after a new aggregation result
    ///
    /// Keeps the current key when it is still present even if the ordering
    /// changed; otherwise moves to the first combo, or to `NoSelection` when
    /// there are none.
    pub fn reconcile(self, combos: &[Combo]) -> Self {
        match self {
            Selection::Selected(key) if combos.iter().any(|combo| combo.key() == &key) => {
                Selection::Selected(key)
            }
            _ => combos
                .first()
                .map(|combo| Selection::Selected(combo.key().clone()))
                .unwrap_or_default(),
        }
    }

    /// User action choosing a combo by key
    pub fn select(key: ComboKey, combos: &[Combo]) -> Result<Self, SelectionError> {
        if combos.iter().any(|combo| combo.key() == &key) {
            Ok(Selection::Selected(key))
        } else {
            Err(SelectionError::UnknownCombo(key))
        }
    }

    /// The selected combo within `combos`
    pub fn resolve<'a>(&self, combos: &'a [Combo]) -> Option<&'a Combo> {
        let key = self.key()?;
        combos.iter().find(|combo| combo.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combo::aggregate;
    use crate::domain::test_data::fixtures::lap;
    use crate::domain::test_data::{cars, drivers, tracks};
    use crate::domain::week_window::WeekWindow;
    use chrono::Duration;

    fn combos(entries: &[(&str, &str, usize)]) -> Vec<Combo> {
        let window = WeekWindow::current();
        let at = window.start() + Duration::minutes(1);
        let laps: Vec<_> = entries
            .iter()
            .flat_map(|(car, track, count)| {
                (0..*count).map(move |i| lap(drivers::ALICE, car, track, 60.0 + i as f64, at))
            })
            .collect();
        aggregate(&window, &laps)
    }

    fn key_of(combos: &[Combo], index: usize) -> ComboKey {
        combos[index].key().clone()
    }

    #[test]
    fn test_no_selection_moves_to_top_combo() {
        let combos = combos(&[
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 3),
            (cars::MAZDA_MX5_CUP, tracks::OKAYAMA, 1),
        ]);
        assert_eq!(
            Selection::NoSelection.reconcile(&combos),
            Selection::Selected(key_of(&combos, 0))
        );
    }

    #[test]
    fn test_selection_persists_when_order_changes() {
        let before = combos(&[
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 3),
            (cars::MAZDA_MX5_CUP, tracks::OKAYAMA, 1),
        ]);
        let mazda = key_of(&before, 1);
        let selection = Selection::select(mazda.clone(), &before).unwrap();

        let after = combos(&[
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 3),
            (cars::MAZDA_MX5_CUP, tracks::OKAYAMA, 2),
            (cars::PORSCHE_992_CUP, tracks::ROAD_ATLANTA, 6),
        ]);
        assert_eq!(selection.reconcile(&after), Selection::Selected(mazda));
    }

    #[test]
    fn test_vanished_selection_falls_back_to_new_top() {
        let before = combos(&[
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 3),
            (cars::MAZDA_MX5_CUP, tracks::OKAYAMA, 1),
        ]);
        let selection = Selection::select(key_of(&before, 1), &before).unwrap();

        let after = combos(&[
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 1),
            (cars::PORSCHE_992_CUP, tracks::ROAD_ATLANTA, 4),
        ]);
        assert_eq!(
            selection.reconcile(&after),
            Selection::Selected(key_of(&after, 0))
        );
        assert_eq!(key_of(&after, 0).car_name.as_ref(), cars::PORSCHE_992_CUP);
    }

    #[test]
    fn test_empty_result_clears_selection() {
        let before = combos(&[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 1)]);
        let selection = Selection::NoSelection.reconcile(&before);
        assert_eq!(selection.reconcile(&[]), Selection::NoSelection);
    }

    #[test]
    fn test_selecting_absent_key_is_rejected() {
        let combos = combos(&[(cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 1)]);
        let missing = ComboKey::new(
            crate::domain::types::CarName::try_new(cars::MAZDA_MX5_CUP).unwrap(),
            crate::domain::types::TrackName::try_new(tracks::OKAYAMA).unwrap(),
        );
        assert_eq!(
            Selection::select(missing.clone(), &combos),
            Err(SelectionError::UnknownCombo(missing))
        );
    }

    #[test]
    fn test_resolve_finds_selected_combo() {
        let combos = combos(&[
            (cars::TOYOTA_GR86, tracks::LIME_ROCK_PARK, 2),
            (cars::MAZDA_MX5_CUP, tracks::OKAYAMA, 1),
        ]);
        let selection = Selection::Selected(key_of(&combos, 1));
        assert_eq!(selection.resolve(&combos).map(Combo::lap_count), Some(1));
        assert!(Selection::NoSelection.resolve(&combos).is_none());
    }
}
