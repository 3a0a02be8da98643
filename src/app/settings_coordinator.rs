//! Settings persistence.
//!
//! Stores any serializable setting in eframe storage as a JSON string.

use serde::{de::DeserializeOwned, Serialize};

pub struct SettingsCoordinator;

impl SettingsCoordinator {
    /// Loads a setting, falling back to `default` when it is missing or no
    /// longer parses (for example after the stored shape changed).
    pub fn load_setting_or<T>(storage: Option<&dyn eframe::Storage>, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        Self::try_load_setting(storage, key).unwrap_or(default)
    }

    pub fn try_load_setting<T>(storage: Option<&dyn eframe::Storage>, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let json_str = storage?.get_string(key)?;
        match serde_json::from_str(&json_str) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring unreadable stored setting");
                None
            }
        }
    }

    pub fn save_setting<T>(storage: &mut dyn eframe::Storage, key: &str, value: &T)
    where
        T: Serialize,
    {
        match serde_json::to_string(value) {
            Ok(json_str) => storage.set_string(key, json_str),
            Err(err) => tracing::warn!(key, error = %err, "failed to serialize setting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LayoutState;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStorage {
        data: HashMap<String, String>,
    }

    impl eframe::Storage for MockStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.data.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.data.insert(key.to_string(), value);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn layout_round_trips_through_storage() {
        let mut storage = MockStorage::default();
        let mut layout = LayoutState::default();
        layout.resize_column(2, 25.0);
        SettingsCoordinator::save_setting(&mut storage, "layout", &layout);

        let loaded: LayoutState =
            SettingsCoordinator::load_setting_or(Some(&storage), "layout", LayoutState::default());
        assert_eq!(loaded, layout);
    }

    #[test]
    fn missing_or_corrupt_settings_use_default() {
        let mut storage = MockStorage::default();
        storage.set_string_raw("layout", "{not json");
        let loaded: LayoutState =
            SettingsCoordinator::load_setting_or(Some(&storage), "layout", LayoutState::default());
        assert_eq!(loaded, LayoutState::default());

        let none: Option<u32> = SettingsCoordinator::try_load_setting(None, "anything");
        assert_eq!(none, None);
    }

    impl MockStorage {
        fn set_string_raw(&mut self, key: &str, value: &str) {
            self.data.insert(key.to_string(), value.to_string());
        }
    }
}
