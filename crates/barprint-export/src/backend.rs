//! Pluggable document backends for PDF output.
//!
//! PDF is authored by an optional backend looked up by name in a
//! [`BackendRegistry`].  A missing backend is an ordinary
//! [`ExportError::BackendUnavailable`].  A backend built against another
//! API version, or one that fails internally, is
//! [`ExportError::BackendAccess`].
//!
//! Backends may keep process-wide numeric precision state.  Exports take
//! a [`PrecisionGuard`] that sets the state for the duration of the call
//! and restores the previous value when dropped, on success and failure
//! alike.

use barprint_core::{DualColor, Segment};

use crate::error::ExportError;
use crate::settings::ColorModel;

/// API version a backend must report to be used.
pub const BACKEND_API_VERSION: u32 = 1;

/// Name of the backend registered by [`BackendRegistry::with_defaults`].
pub const DEFAULT_PDF_BACKEND: &str = "lopdf";

/// A single-page document request, in PostScript points with y up.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRequest<'a> {
    pub width_pt: f64,
    pub height_pt: f64,
    pub title: Option<&'a str>,
    pub creator: Option<&'a str>,
    pub producer: &'a str,
    pub foreground: DualColor,
    /// `None` leaves the page unpainted.
    pub background: Option<DualColor>,
    pub color_model: ColorModel,
    /// All marks and text as one filled path.
    pub path: &'a [Segment],
}

/// Failure inside a backend.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

/// A document authoring service.
pub trait DocumentBackend: Send + Sync {
    /// Name the backend is registered under.
    fn name(&self) -> &str;

    /// The [`BACKEND_API_VERSION`] the backend was built against.
    fn api_version(&self) -> u32;

    /// Current state of the backend's process-wide precision flag.
    fn high_precision(&self) -> bool;

    fn set_high_precision(&self, enabled: bool);

    /// Produce the complete document.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the document cannot be built.
    fn render(&self, request: &DocumentRequest<'_>) -> Result<Vec<u8>, BackendError>;
}

/// Scoped override of a backend's precision flag.
///
/// The previous value is restored when the guard drops.
pub struct PrecisionGuard<'a> {
    backend: &'a dyn DocumentBackend,
    previous: bool,
}

impl<'a> PrecisionGuard<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn DocumentBackend, enabled: bool) -> Self {
        let previous = backend.high_precision();
        backend.set_high_precision(enabled);
        Self { backend, previous }
    }
}

impl Drop for PrecisionGuard<'_> {
    fn drop(&mut self) {
        self.backend.set_high_precision(self.previous);
    }
}

/// Backends available to the exporter, by name.
#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Box<dyn DocumentBackend>>,
}

impl BackendRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every backend compiled into this build.
    #[must_use]
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "pdf")]
        registry.register(Box::new(crate::pdf::LopdfBackend));
        registry
    }

    /// Add `backend`, replacing any backend of the same name.
    pub fn register(&mut self, backend: Box<dyn DocumentBackend>) {
        self.backends.retain(|b| b.name() != backend.name());
        self.backends.push(backend);
    }

    /// Registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Look up a usable backend.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::BackendUnavailable`] if nothing is registered
    /// under `name`, and [`ExportError::BackendAccess`] if the backend
    /// reports a different API version.
    pub fn resolve(&self, name: &str) -> Result<&dyn DocumentBackend, ExportError> {
        let backend = self
            .backends
            .iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| ExportError::BackendUnavailable(name.to_string()))?;
        let version = backend.api_version();
        if version != BACKEND_API_VERSION {
            return Err(ExportError::BackendAccess {
                name: name.to_string(),
                reason: format!("api version {version}, expected {BACKEND_API_VERSION}"),
            });
        }
        log::debug!("resolved document backend {name:?}");
        Ok(&**backend)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct Fake {
        name: &'static str,
        version: u32,
        precise: AtomicBool,
    }

    impl Fake {
        fn boxed(name: &'static str, version: u32) -> Box<Self> {
            Box::new(Self {
                name,
                version,
                precise: AtomicBool::new(false),
            })
        }
    }

    impl DocumentBackend for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn api_version(&self) -> u32 {
            self.version
        }

        fn high_precision(&self) -> bool {
            self.precise.load(Ordering::SeqCst)
        }

        fn set_high_precision(&self, enabled: bool) {
            self.precise.store(enabled, Ordering::SeqCst);
        }

        fn render(&self, _request: &DocumentRequest<'_>) -> Result<Vec<u8>, BackendError> {
            Ok(b"doc".to_vec())
        }
    }

    #[test]
    fn missing_backend_is_unavailable() {
        let registry = BackendRegistry::new();
        assert!(matches!(
            registry.resolve("lopdf"),
            Err(ExportError::BackendUnavailable(name)) if name == "lopdf"
        ));
    }

    #[test]
    fn version_mismatch_is_access_error() {
        let mut registry = BackendRegistry::new();
        registry.register(Fake::boxed("old", BACKEND_API_VERSION + 1));
        assert!(matches!(
            registry.resolve("old"),
            Err(ExportError::BackendAccess { .. })
        ));
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = BackendRegistry::new();
        registry.register(Fake::boxed("fake", BACKEND_API_VERSION + 1));
        registry.register(Fake::boxed("fake", BACKEND_API_VERSION));
        assert_eq!(registry.names(), vec!["fake"]);
        assert!(registry.resolve("fake").is_ok());
    }

    #[test]
    fn guard_restores_previous_value() {
        let fake = Fake::boxed("fake", BACKEND_API_VERSION);
        fake.set_high_precision(false);
        {
            let _guard = PrecisionGuard::new(fake.as_ref(), true);
            assert!(fake.high_precision());
        }
        assert!(!fake.high_precision());

        fake.set_high_precision(true);
        {
            let _guard = PrecisionGuard::new(fake.as_ref(), false);
            assert!(!fake.high_precision());
        }
        assert!(fake.high_precision());
    }

    #[test]
    fn default_registry_matches_features() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(
            registry.resolve(DEFAULT_PDF_BACKEND).is_ok(),
            cfg!(feature = "pdf")
        );
    }
}
