use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Player '{0}' is no longer online")]
    ViewerOffline(Uuid),
}
