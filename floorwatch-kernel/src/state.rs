use parking_lot::Mutex;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// What a screen currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    /// Mounted, nothing requested yet
    Idle,
    Loading,
    Ready(T),
    /// Fetch failed; the message is what the error view shows
    Failed(String),
}

impl<T> ScreenState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ScreenState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScreenState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        ScreenState::Idle
    }
}
