//! Backend registry and selection.
//!
//! The registry is a fixed constructor list populated at startup.
//! Selection order: the `SLP_BUFMGR_MODULE` environment variable, then
//! the default backend name, then every registered backend in order
//! until one initializes. Manager creation fails only when every
//! candidate does.

use drm_core::{ddebug, dwarn, env_get_opt};

use crate::backend::BufferBackend;
use crate::backends;
use crate::error::{BufMgrError, Result};

/// Environment variable naming a non-default backend.
pub const BACKEND_ENV: &str = "SLP_BUFMGR_MODULE";

/// Backend tried first when the environment does not choose.
pub const DEFAULT_BACKEND: &str = "gem";

type Ctor = fn() -> Result<Box<dyn BufferBackend>>;

struct Entry {
    name: &'static str,
    ctor: Ctor,
}

const REGISTRY: &[Entry] = &[
    Entry {
        name: "gem",
        ctor: backends::gem::new,
    },
    Entry {
        name: "heap",
        ctor: backends::heap::new,
    },
];

pub fn registered_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|e| e.name).collect()
}

fn try_named(name: &str) -> Result<Box<dyn BufferBackend>> {
    let entry = REGISTRY
        .iter()
        .find(|e| e.name == name)
        .ok_or_else(|| BufMgrError::BackendInit {
            name: name.to_string(),
        })?;
    (entry.ctor)()
}

/// Run the selection order and return the first backend that comes up.
pub fn select_backend() -> Result<Box<dyn BufferBackend>> {
    select_backend_from(env_get_opt::<String>(BACKEND_ENV).as_deref())
}

/// Selection order with the requested name passed in explicitly.
/// `select_backend` feeds it the `SLP_BUFMGR_MODULE` value.
pub(crate) fn select_backend_from(requested: Option<&str>) -> Result<Box<dyn BufferBackend>> {
    if let Some(name) = requested {
        match try_named(name) {
            Ok(backend) => {
                ddebug!("buffer backend {} selected via {}", name, BACKEND_ENV);
                return Ok(backend);
            }
            Err(e) => dwarn!("requested backend {} unavailable: {}", name, e),
        }
    }

    match try_named(DEFAULT_BACKEND) {
        Ok(backend) => {
            ddebug!("default buffer backend {} selected", DEFAULT_BACKEND);
            return Ok(backend);
        }
        Err(e) => ddebug!("default backend {} unavailable: {}", DEFAULT_BACKEND, e),
    }

    for entry in REGISTRY {
        if entry.name == DEFAULT_BACKEND {
            continue;
        }
        match (entry.ctor)() {
            Ok(backend) => {
                ddebug!("buffer backend {} selected by scan", entry.name);
                return Ok(backend);
            }
            Err(e) => ddebug!("backend {} unavailable: {}", entry.name, e),
        }
    }

    Err(BufMgrError::NoBackend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_both_backends() {
        let names = registered_names();
        assert!(names.contains(&"gem"));
        assert!(names.contains(&"heap"));
    }

    #[test]
    fn test_unknown_name_is_init_failure() {
        assert!(matches!(
            try_named("no_such_backend"),
            Err(BufMgrError::BackendInit { .. })
        ));
    }

    #[test]
    fn test_heap_backend_constructs() {
        let backend = try_named("heap").unwrap();
        assert_eq!(backend.name(), "heap");
    }

    #[test]
    fn test_requested_name_wins_selection() {
        let backend = select_backend_from(Some("heap")).unwrap();
        assert_eq!(backend.name(), "heap");
    }

    #[test]
    fn test_unknown_request_falls_through_to_scan() {
        let backend = select_backend_from(Some("no_such_backend")).unwrap();
        assert!(registered_names().contains(&backend.name()));
    }
}
