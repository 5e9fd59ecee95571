//! Handles for services loaded once at process start

use std::fmt::Display;
use tracing::{info, warn};

/// A model-backed service, or the reason it could not be loaded.
///
/// Load failures are recorded once; every later call to an unavailable
/// service short-circuits to the caller's error output.
pub enum ServiceHandle<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> ServiceHandle<T> {
    /// Wrap a load result, logging the outcome
    pub fn from_load<E: Display>(name: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(service) => {
                info!("{} loaded", name);
                Self::Ready(service)
            }
            Err(e) => {
                warn!("{} unavailable: {}", name, e);
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Ready(service) => Some(service),
            Self::Unavailable { .. } => None,
        }
    }

    /// Borrow the service, keeping the unavailable reason
    #[must_use]
    pub fn as_ref(&self) -> ServiceHandle<&T> {
        match self {
            Self::Ready(service) => ServiceHandle::Ready(service),
            Self::Unavailable { reason } => ServiceHandle::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> From<T> for ServiceHandle<T> {
    fn from(service: T) -> Self {
        Self::Ready(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_load_records_failure() {
        let handle: ServiceHandle<u32> = ServiceHandle::from_load("stub", Err("no model"));
        assert!(!handle.is_ready());
        assert!(handle.get().is_none());
        assert_eq!(handle.reason(), Some("no model"));
    }

    #[test]
    fn test_from_load_success() {
        let handle: ServiceHandle<u32> = ServiceHandle::from_load::<String>("stub", Ok(7));
        assert_eq!(handle.get(), Some(&7));
        assert!(handle.reason().is_none());
    }

    #[test]
    fn test_as_ref_keeps_reason() {
        let handle: ServiceHandle<String> = ServiceHandle::unavailable("missing weights");
        assert_eq!(handle.as_ref().reason(), Some("missing weights"));

        let ready: ServiceHandle<String> = "tagger".to_string().into();
        assert_eq!(ready.as_ref().get().map(|s| s.as_str()), Some("tagger"));
    }
}
