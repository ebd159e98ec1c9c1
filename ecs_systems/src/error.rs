use thiserror::Error;

/// §7 "Build errors": surfaced by `new_system` returning a nil handle; any
/// partially constructed system is deleted before the error reaches here.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("signature has no components")]
    EmptySignature,
    #[error("component {0:?} does not resolve to a handle")]
    UnresolvedComponent(String),
    #[error("cannot mix FromEntity and FromComponent in one Or column")]
    CrossSourceOr,
    #[error(transparent)]
    Parse(#[from] ecs_core::signature::ParseError),
}

/// §7 "Lookup errors": a handle that does not name a system.
#[derive(Debug, Error)]
#[error("handle does not refer to a system")]
pub struct LookupError;
