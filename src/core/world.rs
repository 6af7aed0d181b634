//=========================================================================
// World
//=========================================================================
//
// Registry of live characters, owned by the stage and passed explicitly
// to whatever needs to iterate it (collision, drawing, dispatch).
//
// Characters hold a `WeakWorld` back-reference so the registry does not
// keep itself alive through its own members.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

//=== Internal Dependencies ===============================================

use super::character::{Character, CharacterId};

//=== World ===============================================================

/// Insertion-ordered collection of live characters.
#[derive(Debug, Clone, Default)]
pub struct World {
    characters: Arc<RwLock<Vec<Character>>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, character: Character) {
        self.write().push(character);
    }

    /// Removes the character with `id`. Returns whether it was present.
    pub fn remove(&self, id: CharacterId) -> bool {
        let mut characters = self.write();
        let before = characters.len();
        characters.retain(|c| c.id() != id);
        characters.len() != before
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.read().iter().any(|c| c.id() == id)
    }

    pub fn get(&self, id: CharacterId) -> Option<Character> {
        self.read().iter().find(|c| c.id() == id).cloned()
    }

    /// Snapshot of the live characters, in insertion order.
    ///
    /// The registry lock is released before the snapshot is returned, so
    /// callers may run handlers that add or remove characters meanwhile.
    pub fn characters(&self) -> Vec<Character> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn downgrade(&self) -> WeakWorld {
        WeakWorld {
            characters: Arc::downgrade(&self.characters),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Character>> {
        self.characters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Character>> {
        self.characters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//=== WeakWorld ===========================================================

/// Non-owning handle to a `World`.
#[derive(Debug, Clone, Default)]
pub struct WeakWorld {
    characters: Weak<RwLock<Vec<Character>>>,
}

impl WeakWorld {
    pub fn upgrade(&self) -> Option<World> {
        self.characters.upgrade().map(|characters| World { characters })
    }

    /// Snapshot of the live characters, empty once the world is gone.
    pub fn characters(&self) -> Vec<Character> {
        self.upgrade().map(|world| world.characters()).unwrap_or_default()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
