//! Error types for lissom-sway.

use thiserror::Error;

/// Errors from configuration validation and engine operations.
///
/// Setup failures carry the index of the offending config in the slice that
/// was passed to `setup`, so hosts can point at the source entry. A failed
/// setup leaves the engine exactly as it was before the call.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configured joint name does not exist in the armature.
    #[error("unknown joint '{name}' (config #{index})")]
    UnknownJoint {
        /// Index into the config slice.
        index: usize,
        /// The name that failed to resolve.
        name: String,
    },

    /// Configured joint has no parent to swing from.
    #[error("joint '{name}' is a root and cannot sway (config #{index})")]
    RootJoint {
        /// Index into the config slice.
        index: usize,
        /// The root joint's name.
        name: String,
    },

    /// The same joint appears in more than one config.
    #[error("joint '{name}' configured more than once (config #{index})")]
    DuplicateJoint {
        /// Index of the second occurrence.
        index: usize,
        /// The duplicated joint's name.
        name: String,
    },

    /// Stiffness or damping lane is negative or not finite.
    #[error("{field} must be finite and non-negative, got {value} (config #{index})")]
    InvalidGain {
        /// Index into the config slice.
        index: usize,
        /// Which coefficient failed.
        field: &'static str,
        /// The offending value.
        value: f32,
    },

    /// External factor outside `[0, 1]`.
    #[error("external factor must be within [0, 1], got {value} (config #{index})")]
    ExternalFactorRange {
        /// Index into the config slice.
        index: usize,
        /// The offending value.
        value: f32,
    },

    /// Limit range is unordered or not finite.
    #[error("limit for lane {lane} must be an ordered finite range (config #{index})")]
    InvalidLimit {
        /// Index into the config slice.
        index: usize,
        /// Lane the malformed limit was declared for.
        lane: usize,
    },

    /// Offset vector contains a non-finite component.
    #[error("{field} must be finite (config #{index})")]
    NonFiniteOffset {
        /// Index into the config slice.
        index: usize,
        /// Which offset failed.
        field: &'static str,
    },

    /// Pivot mode requested on a positional joint.
    #[error("pivot requires a rotational joint kind (config #{index})")]
    PointPivot {
        /// Index into the config slice.
        index: usize,
    },

    /// Rotational kind on a joint with no rest offset from its parent.
    #[error("joint '{name}' sits on its parent; rotational kinds need a rest offset (config #{index})")]
    ZeroLengthJoint {
        /// Index into the config slice.
        index: usize,
        /// The offending joint's name.
        name: String,
    },

    /// Exclusion zone references a joint that does not exist.
    #[error("unknown obstacle joint '{name}' in exclusion zone (config #{index})")]
    UnknownObstacle {
        /// Index into the config slice.
        index: usize,
        /// The name that failed to resolve.
        name: String,
    },

    /// Exclusion zone radius is negative or not finite.
    #[error("exclusion zone radius must be finite and non-negative, got {value} (config #{index})")]
    InvalidZoneRadius {
        /// Index into the config slice.
        index: usize,
        /// The offending radius.
        value: f32,
    },

    /// Operation requires a successful `setup` first.
    #[error("engine has no configuration; call setup first")]
    NotConfigured,

    /// Named joint is not part of the current configuration.
    #[error("joint '{0}' is not configured")]
    UnknownName(String),

    /// Property key string did not match any known property.
    #[error("unknown property key '{0}'")]
    UnknownKey(String),

    /// Joint kind string did not match any known kind.
    #[error("unknown joint kind '{0}'")]
    UnknownKind(String),
}
