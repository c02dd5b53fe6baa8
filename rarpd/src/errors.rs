use crate::channel::ChannelError;
use crate::interface::InterfaceError;
use crate::mapping::MappingError;
use thiserror::Error;

/// Anything that stops the server.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Interface(#[from] InterfaceError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
