use std::collections::BTreeMap;

use instrkit_object::{wire, Object};

/// Launch configuration for [`Instruments::launch_app`](crate::Instruments::launch_app).
///
/// Settings are additive: a later call overwrites an earlier one for the same
/// key. Option keys are not validated and reach the remote side unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    /// Executable path override. Empty means the bundle's default executable.
    pub app_path: String,
    pub environment: BTreeMap<String, Object>,
    pub arguments: Vec<Object>,
    pub options: BTreeMap<String, Object>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        let mut options = BTreeMap::new();
        options.insert(wire::launch::START_SUSPENDED.to_string(), Object::UInt(0));
        options.insert(wire::launch::KILL_EXISTING.to_string(), Object::UInt(0));
        Self {
            app_path: String::new(),
            environment: BTreeMap::new(),
            arguments: Vec::new(),
            options,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_path(mut self, path: impl Into<String>) -> Self {
        self.app_path = path.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment
            .insert(key.into(), Object::String(value.into()));
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(Object::String(arg.into()));
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments
            .extend(args.into_iter().map(|arg| Object::String(arg.into())));
        self
    }

    /// Set a raw launch option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Object>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Launch the process suspended.
    pub fn start_suspended(self, enabled: bool) -> Self {
        self.with_option(wire::launch::START_SUSPENDED, Object::UInt(u64::from(enabled)))
    }

    /// Kill a running instance of the app before launching.
    pub fn kill_existing(self, enabled: bool) -> Self {
        self.with_option(wire::launch::KILL_EXISTING, Object::UInt(u64::from(enabled)))
    }

    /// Arguments of the launch selector, in wire order.
    pub fn to_args(&self, bundle_id: &str) -> Vec<Object> {
        vec![
            Object::String(self.app_path.clone()),
            Object::from(bundle_id),
            Object::Map(self.environment.clone()),
            Object::List(self.arguments.clone()),
            Object::Map(self.options.clone()),
        ]
    }
}

/// Query for [`Instruments::installed_applications`](crate::Instruments::installed_applications).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppListOptions {
    /// Only applications whose fields match every entry are returned.
    pub matching: BTreeMap<String, Object>,
    /// Token for incremental queries. Empty asks for a full listing.
    pub update_token: String,
}

impl AppListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, key: impl Into<String>, value: impl Into<Object>) -> Self {
        self.matching.insert(key.into(), value.into());
        self
    }

    pub fn with_update_token(mut self, token: impl Into<String>) -> Self {
        self.update_token = token.into();
        self
    }

    /// Arguments of the listing selector, in wire order.
    pub fn to_args(&self) -> Vec<Object> {
        vec![
            Object::Map(self.matching.clone()),
            Object::String(self.update_token.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_defaults_are_off() {
        let args = LaunchOptions::default().to_args("com.example.app");
        assert_eq!(args.len(), 5);
        assert_eq!(args[0], Object::from(""));
        assert_eq!(args[1], Object::from("com.example.app"));
        assert_eq!(args[2], Object::empty_map());
        assert_eq!(args[3], Object::empty_list());
        assert_eq!(
            args[4].get(wire::launch::START_SUSPENDED),
            Some(&Object::UInt(0))
        );
        assert_eq!(
            args[4].get(wire::launch::KILL_EXISTING),
            Some(&Object::UInt(0))
        );
    }

    #[test]
    fn later_settings_overwrite_and_unknown_keys_pass_through() {
        let options = LaunchOptions::new()
            .start_suspended(true)
            .with_option(wire::launch::START_SUSPENDED, Object::UInt(0))
            .kill_existing(true)
            .with_option("ActivateSuspended", Object::Bool(true))
            .with_env("A", "1")
            .with_env("A", "2")
            .with_arg("-v")
            .with_args(["--flag", "x"]);

        assert_eq!(
            options.options.get(wire::launch::START_SUSPENDED),
            Some(&Object::UInt(0))
        );
        assert_eq!(
            options.options.get(wire::launch::KILL_EXISTING),
            Some(&Object::UInt(1))
        );
        assert_eq!(options.options.get("ActivateSuspended"), Some(&Object::Bool(true)));
        assert_eq!(options.environment.get("A"), Some(&Object::from("2")));
        assert_eq!(
            options.arguments,
            vec![Object::from("-v"), Object::from("--flag"), Object::from("x")]
        );
    }

    #[test]
    fn app_list_arguments_put_filter_before_token() {
        let args = AppListOptions::new()
            .with_update_token("abc")
            .with_match("Type", "System")
            .to_args();

        let filter: Object = [("Type", "System")].into_iter().collect();
        assert_eq!(args, vec![filter, Object::from("abc")]);
    }
}
