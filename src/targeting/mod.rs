//! Targeting configuration and the geometric selection engine.
//!
//! A targeting config describes a selection strategy declaratively:
//! geometry mode, team filter, origin, ranges, count cap, sort policy and
//! tag filters. The engine resolves it against the world's spatial
//! queries with deterministic tie-breaking.

mod engine;

pub use engine::{has_line_of_sight, is_within_shape, resolve_targets};

use serde::{Deserialize, Serialize};

/// The geometric/selection strategy used to find candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetingMode {
    /// Only the caster.
    #[default]
    Self_,
    /// One target: the explicit one when valid, otherwise the best
    /// candidate in range by sort policy.
    Single,
    /// Every valid candidate within radius (or range).
    Sphere,
    /// Sphere candidates inside the facing cone.
    Cone,
    /// Forward-anchored oriented box.
    Line,
    /// Origin-centered oriented box.
    Box,
    /// A sequence of hops, each within chain range of the previous pick.
    Chain,
    /// Sphere candidates sampled uniformly without replacement.
    Random,
}

/// Which team relationship candidates must have with the caster.
///
/// Computed by team-membership comparison, never by identity; `Self_`
/// and `Ally` both mean "same team" - `Self_` marks authored intent for
/// self-or-own-team casts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamFilter {
    #[default]
    Any,
    Self_,
    Ally,
    Enemy,
}

/// Where the shape is anchored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginMode {
    /// The caster's position.
    #[default]
    Caster,
    /// The cast's aim point (falls back to the caster's position).
    AimPoint,
}

/// How ranked candidates are ordered before the count cap applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortPolicy {
    /// Preserve candidate order.
    #[default]
    None,
    /// Squared distance to the shape origin, ascending.
    Closest,
    /// Squared distance, descending.
    Farthest,
    /// Current health, ascending.
    LowestHealth,
    /// Current health, descending.
    HighestHealth,
    /// Uniform sample without replacement.
    Random,
}

/// Declarative targeting strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetingConfig {
    /// Geometry/selection mode.
    pub mode: TargetingMode,
    /// Team relationship filter.
    pub team: TeamFilter,
    /// Shape anchor.
    pub origin: OriginMode,
    /// Reach of the shape (selection radius, box length, chain pool).
    pub range: f32,
    /// Secondary extent: sphere radius, cone/box half-width, chain hop
    /// range. Falls back to `range` when zero.
    pub radius: f32,
    /// Full cone angle in degrees.
    pub angle: f32,
    /// Count cap. Zero means a single target.
    pub max_targets: usize,
    /// Ranking applied before the count cap.
    pub sort: SortPolicy,
    /// Tags a candidate must carry.
    pub required_tags: Vec<String>,
    /// Tags that disqualify a candidate.
    pub blocked_tags: Vec<String>,
    /// Whether the caster itself may be selected.
    pub include_self: bool,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            mode: TargetingMode::Self_,
            team: TeamFilter::Any,
            origin: OriginMode::Caster,
            range: 0.0,
            radius: 0.0,
            angle: 0.0,
            max_targets: 1,
            sort: SortPolicy::None,
            required_tags: Vec::new(),
            blocked_tags: Vec::new(),
            include_self: true,
        }
    }
}

impl TargetingConfig {
    /// Target only the caster.
    #[must_use]
    pub fn self_only() -> Self {
        Self::default()
    }

    /// One enemy within range, closest first.
    #[must_use]
    pub fn single(range: f32) -> Self {
        Self {
            mode: TargetingMode::Single,
            team: TeamFilter::Enemy,
            range,
            sort: SortPolicy::Closest,
            include_self: false,
            ..Self::default()
        }
    }

    /// Up to `max_targets` enemies within `radius` of the origin.
    #[must_use]
    pub fn sphere(radius: f32, max_targets: usize) -> Self {
        Self {
            mode: TargetingMode::Sphere,
            team: TeamFilter::Enemy,
            radius,
            range: radius,
            max_targets,
            sort: SortPolicy::Closest,
            include_self: false,
            ..Self::default()
        }
    }

    /// Enemies inside a facing cone.
    #[must_use]
    pub fn cone(range: f32, angle: f32, max_targets: usize) -> Self {
        Self {
            mode: TargetingMode::Cone,
            team: TeamFilter::Enemy,
            range,
            angle,
            max_targets,
            sort: SortPolicy::Closest,
            include_self: false,
            ..Self::default()
        }
    }

    /// Chain of hops: initial pick within `range`, hops within `hop_range`.
    #[must_use]
    pub fn chain(range: f32, hop_range: f32, max_targets: usize) -> Self {
        Self {
            mode: TargetingMode::Chain,
            team: TeamFilter::Enemy,
            range,
            radius: hop_range,
            max_targets,
            sort: SortPolicy::Closest,
            include_self: false,
            ..Self::default()
        }
    }

    /// Set the team filter (builder pattern).
    #[must_use]
    pub fn with_team(mut self, team: TeamFilter) -> Self {
        self.team = team;
        self
    }

    /// Set the mode (builder pattern).
    #[must_use]
    pub fn with_mode(mut self, mode: TargetingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the sort policy (builder pattern).
    #[must_use]
    pub fn with_sort(mut self, sort: SortPolicy) -> Self {
        self.sort = sort;
        self
    }

    /// Set the origin mode (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: OriginMode) -> Self {
        self.origin = origin;
        self
    }

    /// Require a tag on candidates (builder pattern).
    #[must_use]
    pub fn requiring_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.push(tag.into());
        self
    }

    /// Block a tag on candidates (builder pattern).
    #[must_use]
    pub fn blocking_tag(mut self, tag: impl Into<String>) -> Self {
        self.blocked_tags.push(tag.into());
        self
    }

    /// Allow or forbid selecting the caster (builder pattern).
    #[must_use]
    pub fn with_include_self(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }

    /// The effective selection radius (`radius`, falling back to `range`).
    #[must_use]
    pub fn effective_radius(&self) -> f32 {
        if self.radius > 0.0 {
            self.radius
        } else {
            self.range
        }
    }

    /// The effective count cap (at least one).
    #[must_use]
    pub fn effective_max(&self) -> usize {
        self.max_targets.max(1)
    }
}
