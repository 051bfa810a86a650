//! Entity and team identification.
//!
//! Every unit, projectile and summon in the host world has a unique
//! `EntityId`. The engine never interprets ids - they're opaque handles
//! into the world's entity store.

use serde::{Deserialize, Serialize};

/// Unique identifier for any world entity.
///
/// Units, unit parts (colliders, attachment points) and summons all have
/// EntityIds. The engine resolves ids through the world's capability
/// lookup; the id itself carries no meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Team membership for a unit.
///
/// Ally/enemy relationships are computed by comparing team membership,
/// never by entity identity: two units on the same team are allies even
/// if one of them is the caster itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(pub u8);

impl Team {
    /// Create a new team.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw team value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check whether another team is an ally (same membership).
    #[must_use]
    pub fn is_ally(self, other: Team) -> bool {
        self == other
    }

    /// Check whether another team is an enemy (different membership).
    #[must_use]
    pub fn is_enemy(self, other: Team) -> bool {
        self != other
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// The kind of spendable resource a cast is paid with.
///
/// Units carry at most one resource pool; a cost whose kind doesn't match
/// the pool is simply unpayable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Mana,
    Energy,
    Stamina,
}
