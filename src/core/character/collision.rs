//=========================================================================
// Collision
//=========================================================================
//
// Hit interests and overlap evaluation against the live world.
//
// Evaluation order:
//   1. intersect the interest set with the live world (stale ids drop out)
//   2. expand `HitTarget::Any` to every other live character
//   3. keep candidates whose drawn rectangle overlaps this character's
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::{Character, CharacterId};
use crate::core::events::HitTarget;

//=== CollisionTargetSet ==================================================

/// Deduplicated, unordered set of collision interests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionTargetSet {
    targets: HashSet<HitTarget>,
}

impl CollisionTargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I>(&mut self, targets: I)
    where
        I: IntoIterator<Item = HitTarget>,
    {
        self.targets.extend(targets);
    }

    pub fn contains(&self, target: &HitTarget) -> bool {
        self.targets.contains(target)
    }

    /// True when a character with `id` is of interest.
    pub fn includes(&self, id: CharacterId) -> bool {
        self.targets.iter().any(|target| target.includes(id))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Drops character targets that are not in `live`.
    pub fn retain_live(&mut self, live: &[CharacterId]) {
        self.targets.retain(|target| match target {
            HitTarget::Any => true,
            HitTarget::Character(id) => live.contains(id),
        });
    }
}

//=== Character ===========================================================

impl Character {
    /// Adds targets to this character's collision interests.
    ///
    /// Nested collections can be passed flattened:
    /// `register_hit_interest(groups.iter().flatten().copied())`.
    pub fn register_hit_interest<I, T>(&self, targets: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<HitTarget>,
    {
        self.state()
            .targets
            .extend(targets.into_iter().map(Into::into));
    }

    /// Snapshot of the current collision interests.
    pub fn hit_targets(&self) -> CollisionTargetSet {
        self.state().targets.clone()
    }

    /// Live characters of interest that overlap this one.
    ///
    /// Prunes interests in characters that have left the world.
    pub fn colliding(&self) -> Vec<Character> {
        let world = self.inner.world.characters();
        let live: Vec<CharacterId> = world.iter().map(Character::id).collect();

        let (targets, own) = {
            let mut state = self.state();
            state.targets.retain_live(&live);
            (state.targets.clone(), state.rect())
        };
        if targets.is_empty() {
            return Vec::new();
        }

        world
            .into_iter()
            .filter(|other| other.id() != self.id() && targets.includes(other.id()))
            .filter(|other| other.rect().overlaps(&own))
            .collect()
    }

    /// True when `other` is live, distinct from this character, and their
    /// drawn rectangles overlap.
    pub fn hit_test(&self, other: &Character) -> bool {
        if other.id() == self.id() {
            return false;
        }
        let live = self
            .inner
            .world
            .upgrade()
            .is_some_and(|world| world.contains(other.id()));
        live && self.rect().overlaps(&other.rect())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;
    use crate::core::character::CharacterOptions;

    fn costumed(x: f64, y: f64) -> CharacterOptions {
        CharacterOptions::new().at(x, y).costume("car1.png")
    }

    #[test]
    fn interests_are_deduplicated() {
        let fx = fixture((640, 480), 20);
        let car = fx.stage.create_character(costumed(0.0, 0.0)).unwrap();
        let rock = fx.stage.create_character(costumed(50.0, 0.0)).unwrap();

        car.register_hit_interest([&rock, &rock]);
        car.register_hit_interest([HitTarget::Any, HitTarget::Any]);

        let targets = car.hit_targets();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&HitTarget::Character(rock.id())));
    }

    #[test]
    fn colliding_returns_overlapping_targets_only() {
        let fx = fixture((640, 480), 20);
        let car = fx.stage.create_character(costumed(0.0, 0.0)).unwrap();
        let near = fx.stage.create_character(costumed(10.0, 10.0)).unwrap();
        let far = fx.stage.create_character(costumed(300.0, 300.0)).unwrap();
        let ignored = fx.stage.create_character(costumed(5.0, 5.0)).unwrap();

        car.register_hit_interest([&near, &far]);

        assert_eq!(car.colliding(), vec![near.clone()]);
        assert!(!car.colliding().contains(&ignored));
    }

    #[test]
    fn any_expands_to_every_other_character() {
        let fx = fixture((640, 480), 20);
        let car = fx.stage.create_character(costumed(0.0, 0.0)).unwrap();
        let a = fx.stage.create_character(costumed(10.0, 0.0)).unwrap();
        let b = fx.stage.create_character(costumed(0.0, 10.0)).unwrap();

        car.register_hit_interest([HitTarget::Any]);
        assert_eq!(car.colliding(), vec![a, b]);
    }

    #[test]
    fn hit_test_follows_rect_overlap() {
        let fx = fixture((640, 480), 20);
        let car = fx.stage.create_character(costumed(0.0, 0.0)).unwrap();
        let other = fx.stage.create_character(costumed(19.0, 0.0)).unwrap();

        assert!(car.hit_test(&other));
        other.set_position(20.0, 0.0);
        assert!(!car.hit_test(&other));
        assert!(!car.hit_test(&car));
    }

    #[test]
    fn removed_target_is_silently_dropped() {
        let fx = fixture((640, 480), 20);
        let car = fx.stage.create_character(costumed(0.0, 0.0)).unwrap();
        let other = fx.stage.create_character(costumed(5.0, 5.0)).unwrap();
        car.register_hit_interest([&other]);

        assert!(car.hit_test(&other));
        assert_eq!(car.colliding().len(), 1);

        fx.stage.world().remove(other.id());

        assert!(!car.hit_test(&other));
        assert!(car.colliding().is_empty());
        assert!(car.hit_targets().is_empty());
    }
}
