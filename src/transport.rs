use crate::errors::WardenError;

/// Outbound chat primitive: deliver `text` to a channel or a nickname.
pub trait Transport: Send + Sync {
    fn send(&self, destination: &str, text: &str) -> Result<(), WardenError>;
}
