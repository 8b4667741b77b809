use crate::domain::recommendation::{Recommendation, ScheduleSlot};
use crate::domain::supplement::SupplementKind;
use std::collections::BTreeMap;

const EXERCISE_WORDS: &[&str] = &["exercise", "workout", "training", "ejercicio", "entrenamiento", "entreno"];
const PRE_WORDS: &[&str] = &["antes", "before", "pre-entreno", "pre-workout"];
const POST_WORDS: &[&str] = &["después", "despues", "after", "post-entreno", "post-workout"];
const SLEEP_WORDS: &[&str] = &["sleep", "bedtime", "dormir", "acostarse", "sueño"];
const NIGHT_WORDS: &[&str] = &["night", "noche"];
const MORNING_WORDS: &[&str] = &["morning", "breakfast", "fasting", "mañana", "desayuno", "ayunas"];
const SPLIT_DOSE_WORDS: &[&str] = &["split dose", "divided dose", "dosis dividida"];
const MEAL_WORDS: &[&str] = &["meal", "food", "fat", "comida", "alimento", "grasa"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Slot(ScheduleSlot),
    /// Exercise-linked without a pre/post hint; ends up in [`ScheduleSlot::PostExercise`].
    Exercise,
}

pub fn classify_slot(timing: &str, kind: SupplementKind) -> Placement {
    let text = timing.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if kind.is_exercise_linked() || mentions(EXERCISE_WORDS) {
        return if mentions(PRE_WORDS) {
            Placement::Slot(ScheduleSlot::PreExercise)
        } else if mentions(POST_WORDS) {
            Placement::Slot(ScheduleSlot::PostExercise)
        } else {
            Placement::Exercise
        };
    }
    if mentions(SLEEP_WORDS) || (kind == SupplementKind::Magnesium && mentions(NIGHT_WORDS)) {
        return Placement::Slot(ScheduleSlot::Evening);
    }
    if mentions(MORNING_WORDS) || kind == SupplementKind::VitaminD {
        return Placement::Slot(ScheduleSlot::Morning);
    }
    if mentions(SPLIT_DOSE_WORDS) {
        return match kind {
            SupplementKind::Magnesium | SupplementKind::Calcium => Placement::Slot(ScheduleSlot::WithMeals),
            _ => Placement::Slot(ScheduleSlot::Morning),
        };
    }
    if mentions(MEAL_WORDS) || kind.is_taken_with_meals() {
        return Placement::Slot(ScheduleSlot::WithMeals);
    }
    Placement::Slot(ScheduleSlot::WithMeals)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule<'r> {
    slots: BTreeMap<ScheduleSlot, Vec<&'r Recommendation>>,
}

impl<'r> Schedule<'r> {
    pub fn slot(&self, slot: ScheduleSlot) -> &[&'r Recommendation] {
        self.slots.get(&slot).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn slot_of(&self, name: &str) -> Option<ScheduleSlot> {
        self.slots
            .iter()
            .find(|(_, items)| items.iter().any(|r| r.name == name))
            .map(|(slot, _)| *slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScheduleSlot, &[&'r Recommendation])> + '_ {
        self.slots
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(slot, items)| (*slot, items.as_slice()))
    }

    pub fn names(&self) -> BTreeMap<ScheduleSlot, Vec<String>> {
        self.iter()
            .map(|(slot, items)| (slot, items.iter().map(|r| r.name.clone()).collect()))
            .collect()
    }

    fn items_mut(&mut self, slot: ScheduleSlot) -> &mut Vec<&'r Recommendation> {
        self.slots.entry(slot).or_default()
    }

    fn has_room(&self, slot: ScheduleSlot) -> bool {
        slot.capacity().map_or(true, |cap| self.slot(slot).len() < cap)
    }

    fn holds(&self, slot: ScheduleSlot, pred: impl Fn(SupplementKind) -> bool) -> bool {
        self.slot(slot).iter().any(|r| pred(r.kind))
    }
}

/// The result depends only on the input order.
pub fn schedule(recommendations: &[Recommendation]) -> Schedule<'_> {
    let mut schedule = Schedule {
        slots: ScheduleSlot::ALL.into_iter().map(|s| (s, Vec::new())).collect(),
    };

    let mut exercise = Vec::new();
    for rec in recommendations {
        match classify_slot(&rec.timing, rec.kind) {
            Placement::Slot(slot) => schedule.items_mut(slot).push(rec),
            Placement::Exercise => exercise.push(rec),
        }
    }
    schedule.items_mut(ScheduleSlot::PostExercise).extend(exercise);

    rebalance_morning(&mut schedule);
    rebalance_with_meals(&mut schedule);
    separate_iron_from_calcium(&mut schedule);
    schedule
}

fn rebalance_morning(schedule: &mut Schedule<'_>) {
    let Some(cap) = ScheduleSlot::Morning.capacity() else {
        return;
    };
    let morning = schedule.items_mut(ScheduleSlot::Morning);
    if morning.len() > cap {
        let excess = morning.split_off(cap);
        tracing::debug!(moved = excess.len(), "morning over capacity");
        schedule.items_mut(ScheduleSlot::WithMeals).extend(excess);
    }
}

fn rebalance_with_meals(schedule: &mut Schedule<'_>) {
    let Some(cap) = ScheduleSlot::WithMeals.capacity() else {
        return;
    };
    if schedule.slot(ScheduleSlot::WithMeals).len() <= cap {
        return;
    }

    let items = std::mem::take(schedule.items_mut(ScheduleSlot::WithMeals));
    let (mut fat_soluble, others): (Vec<_>, Vec<_>) = items.into_iter().partition(|r| r.kind.is_fat_soluble());
    let mut to_evening = if fat_soluble.len() > cap {
        fat_soluble.split_off(cap)
    } else {
        Vec::new()
    };
    *schedule.items_mut(ScheduleSlot::WithMeals) = fat_soluble;

    for rec in others {
        if schedule.has_room(ScheduleSlot::Morning) {
            schedule.items_mut(ScheduleSlot::Morning).push(rec);
        } else if schedule.has_room(ScheduleSlot::WithMeals) {
            schedule.items_mut(ScheduleSlot::WithMeals).push(rec);
        } else {
            to_evening.push(rec);
        }
    }
    if !to_evening.is_empty() {
        tracing::debug!(moved = to_evening.len(), "with-meals over capacity; moving to evening");
        schedule.items_mut(ScheduleSlot::Evening).extend(to_evening);
    }
}

const IRON_TARGETS: [ScheduleSlot; 5] = [
    ScheduleSlot::Morning,
    ScheduleSlot::WithMeals,
    ScheduleSlot::Evening,
    ScheduleSlot::PostExercise,
    ScheduleSlot::PreExercise,
];

fn separate_iron_from_calcium(schedule: &mut Schedule<'_>) {
    for slot in ScheduleSlot::ALL {
        if !schedule.holds(slot, |k| k == SupplementKind::Calcium) {
            continue;
        }
        let items = schedule.items_mut(slot);
        let (iron, rest): (Vec<_>, Vec<_>) = std::mem::take(items)
            .into_iter()
            .partition(|r| r.kind.competes_with_calcium());
        *items = rest;

        for rec in iron {
            let target = IRON_TARGETS.into_iter().find(|&t| {
                t != slot && schedule.has_room(t) && !schedule.holds(t, |k| k == SupplementKind::Calcium)
            });
            match target {
                Some(target) => {
                    tracing::debug!(supplement = %rec.name, from = ?slot, to = ?target, "separated from calcium");
                    schedule.items_mut(target).push(rec);
                }
                None => {
                    tracing::warn!(supplement = %rec.name, "no slot free of calcium; leaving in place");
                    schedule.items_mut(slot).push(rec);
                }
            }
        }
    }
}
