/// Faults raised while building or querying a track.
///
/// All of these are recovered locally by the caller: a malformed track
/// produces no mesh and the vehicle holds its last valid pose.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    #[error("curve needs at least 2 control points, got {count}")]
    TooFewControlPoints { count: usize },
    #[error("curve has zero length")]
    ZeroLength,
    #[error("no curve available for the current track")]
    MissingCurve,
    #[error("non-finite value produced while evaluating {0}")]
    NonFinite(&'static str),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}
