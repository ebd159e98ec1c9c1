use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no component or entity is registered under the name {0:?}")]
    UnknownName(String),
    #[error("entity {0} does not exist")]
    UnknownEntity(crate::handle::Handle),
}
