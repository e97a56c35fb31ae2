//! Backend registration.

use qjku_hal::BackendRegistry;

use crate::backend::{BACKEND_NAME, JkuBackend};

/// A registry with the JKU simulator available as `qasm_simulator`.
pub fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    register(&mut registry);
    registry
}

/// Add the JKU simulator to an existing registry.
pub fn register(registry: &mut BackendRegistry) {
    registry.register::<JkuBackend>(BACKEND_NAME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use qjku_hal::{BackendConfig, HalError};

    #[test]
    fn test_registry_lists_simulator() {
        let registry = registry();
        assert_eq!(registry.available_backends(), vec!["qasm_simulator"]);
        assert!(registry.has_backend("qasm_simulator"));
    }

    #[test]
    fn test_create_needs_executable() {
        let registry = registry();
        let err = registry
            .create("qasm_simulator", BackendConfig::new("qasm_simulator"))
            .err();
        assert!(matches!(err, Some(HalError::Configuration(_))));
    }
}
