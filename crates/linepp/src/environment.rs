//! Environment variable lookup used by `env:` references

use std::collections::HashMap;

/// Read-only view of environment variables
pub trait Environment: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_environment() {
        let env: HashMap<String, String> = [("HOME".to_string(), "/home/op".to_string())].into();
        assert_eq!(env.var("HOME").as_deref(), Some("/home/op"));
        assert_eq!(env.var("PATH"), None);
    }

    #[test]
    fn test_process_environment_missing() {
        assert_eq!(ProcessEnvironment.var("LINEPP_SURELY_NOT_SET_4711"), None);
    }
}
