//! Driver registry for pulse drivers.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving pulse
//! driver factories. This uses constructor-injection rather than global state.

use feeder_common::pulse::driver::{DriverFactory, PulseDriver, PulseError};
use std::collections::HashMap;

/// Registry of available pulse drivers.
///
/// Constructed at startup, populated via `register()`, and passed by value
/// to the bootstrap code. No global state — testable in isolation.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Create a driver instance by name.
    ///
    /// # Errors
    /// Returns `PulseError::DriverNotFound` if no driver with the given
    /// name is registered.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn PulseDriver>, PulseError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| PulseError::DriverNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered driver names.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feeder_common::pulse::config::PulseChannelConfig;

    struct TestDriver;

    impl PulseDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn init(&mut self, _config: &PulseChannelConfig) -> Result<(), PulseError> {
            Ok(())
        }

        fn set_duty_us(&mut self, _duty_us: f64) -> Result<(), PulseError> {
            Ok(())
        }

        fn duty_us(&self) -> f64 {
            0.0
        }

        fn shutdown(&mut self) -> Result<(), PulseError> {
            Ok(())
        }
    }

    fn create_test_driver() -> Box<dyn PulseDriver> {
        Box::new(TestDriver)
    }

    #[test]
    fn registry_register_and_create() {
        let mut reg = DriverRegistry::new();
        reg.register("test_driver", create_test_driver);

        let driver = reg.create_driver("test_driver").expect("should create");
        assert_eq!(driver.name(), "test");
    }

    #[test]
    fn registry_driver_not_found() {
        let reg = DriverRegistry::new();
        let result = reg.create_driver("nonexistent");
        assert!(matches!(result, Err(PulseError::DriverNotFound(_))));
    }

    #[test]
    fn registry_list_drivers() {
        let mut reg = DriverRegistry::new();
        reg.register("alpha", create_test_driver);
        reg.register("beta", create_test_driver);

        let mut names = reg.list_drivers();
        names.sort();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut reg = DriverRegistry::new();
        reg.register("dup", create_test_driver);
        reg.register("dup", create_test_driver);
    }

    #[test]
    fn builtin_registry_has_simulation() {
        let reg = DriverRegistry::with_builtin_drivers();
        assert!(reg.get_factory("simulation").is_some());
    }
}
