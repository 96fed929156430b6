use dashmap::DashMap;

/// Named parameters mirroring the last document of each channel
#[derive(Debug, Default)]
pub struct ParameterStore {
    values: DashMap<String, String>,
}

impl ParameterStore {
    /// Set `name`, replacing any previous value
    pub fn set(&self, name: &str, value: &str) {
        if self.values.insert(name.to_string(), value.to_string()).is_some() {
            tracing::debug!(parameter = %name, "Parameter value replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|v| v.value().clone())
    }

    /// Parameter names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let store = ParameterStore::default();
        store.set("robot_description/arm", "A");
        store.set("robot_description/arm", "B");

        assert_eq!(store.get("robot_description/arm").as_deref(), Some("B"));
        assert_eq!(store.names(), vec!["robot_description/arm".to_string()]);
    }

    #[test]
    fn test_names_sorted() {
        let store = ParameterStore::default();
        store.set("b", "1");
        store.set("a", "2");

        assert_eq!(store.names(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.get("c").is_none());
    }
}
