//! Registry of named presets.

use std::collections::BTreeMap;
use std::fmt;

use deepchall_core::BackendInfo;

use crate::lang::{DyckCfg, Language, ParityFsm, ToyCfg, ToyFsm};
use crate::net::{Markov, Net, Uniform};

/// Builds a fresh language instance.
pub type LangFactory = fn() -> Box<dyn Language>;

/// Builds a fresh net instance.
pub type NetFactory = fn() -> Box<dyn Net>;

fn make_lang<L: Language + Default + 'static>() -> Box<dyn Language> {
    Box::new(L::default())
}

fn make_net<N: Net + Default + 'static>() -> Box<dyn Net> {
    Box::new(N::default())
}

/// Name-indexed factories for languages and nets, plus backend metadata.
///
/// Built once and passed to whatever needs to resolve preset names. Every
/// lookup returns a fresh instance, so runs never share state.
pub struct Registry {
    langs: BTreeMap<&'static str, LangFactory>,
    nets: BTreeMap<&'static str, NetFactory>,
    backends: Vec<BackendInfo>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            langs: BTreeMap::new(),
            nets: BTreeMap::new(),
            backends: Vec::new(),
        }
    }

    /// Every preset and backend shipped with the crate.
    pub fn builtin() -> Self {
        Self::new()
            .with_backends(deepchall_backends::backend_infos())
            .with_lang::<ToyFsm>()
            .with_lang::<ToyCfg>()
            .with_lang::<ParityFsm>()
            .with_lang::<DyckCfg>()
            .with_net::<Markov>()
            .with_net::<Uniform>()
    }

    /// Register a language factory under the name its instances report.
    pub fn register_lang(&mut self, factory: LangFactory) {
        self.langs.insert(factory().name(), factory);
    }

    /// Register a net factory under the name its instances report.
    pub fn register_net(&mut self, factory: NetFactory) {
        self.nets.insert(factory().name(), factory);
    }

    /// Register a default-constructible language (builder pattern).
    pub fn with_lang<L: Language + Default + 'static>(mut self) -> Self {
        self.register_lang(make_lang::<L>);
        self
    }

    /// Register a default-constructible net (builder pattern).
    pub fn with_net<N: Net + Default + 'static>(mut self) -> Self {
        self.register_net(make_net::<N>);
        self
    }

    pub fn with_backends(mut self, backends: impl IntoIterator<Item = BackendInfo>) -> Self {
        self.backends.extend(backends);
        self
    }

    /// Fresh instance of the named language.
    pub fn lang(&self, name: &str) -> Option<Box<dyn Language>> {
        self.langs.get(name).map(|factory| factory())
    }

    /// Fresh instance of the named net.
    pub fn net(&self, name: &str) -> Option<Box<dyn Net>> {
        self.nets.get(name).map(|factory| factory())
    }

    pub fn contains_lang(&self, name: &str) -> bool {
        self.langs.contains_key(name)
    }

    pub fn contains_net(&self, name: &str) -> bool {
        self.nets.contains_key(name)
    }

    /// Language names in sorted order.
    pub fn lang_names(&self) -> Vec<&'static str> {
        self.langs.keys().copied().collect()
    }

    /// Net names in sorted order.
    pub fn net_names(&self) -> Vec<&'static str> {
        self.nets.keys().copied().collect()
    }

    /// One fresh instance of every language, sorted by name.
    pub fn langs(&self) -> impl Iterator<Item = Box<dyn Language>> + '_ {
        self.langs.values().map(|factory| factory())
    }

    /// One fresh instance of every net, sorted by name.
    pub fn nets(&self) -> impl Iterator<Item = Box<dyn Net>> + '_ {
        self.nets.values().map(|factory| factory())
    }

    /// Backend kinds in registration order.
    pub fn backends(&self) -> &[BackendInfo] {
        &self.backends
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("langs", &self.lang_names())
            .field("nets", &self.net_names())
            .field(
                "backends",
                &self.backends.iter().map(|b| b.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.lang_names(),
            vec!["dyck_cfg", "parity_fsm", "toy_cfg", "toy_fsm"]
        );
        assert_eq!(registry.net_names(), vec!["markov", "uniform"]);
        let backends: Vec<_> = registry.backends().iter().map(|b| b.name).collect();
        assert_eq!(backends, vec!["fsm", "cfg"]);
    }

    #[test]
    fn test_lookup_returns_fresh_instances() {
        let registry = Registry::builtin();
        let lang = registry.lang("toy_cfg").unwrap();
        assert_eq!(lang.name(), "toy_cfg");
        assert_eq!(lang.alphabet_size(), 2);
        assert!(registry.lang("nope").is_none());
        assert!(registry.net("markov").is_some());
        assert!(registry.contains_net("uniform"));
        assert!(!registry.contains_lang("markov"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new().with_lang::<ToyFsm>();
        assert_eq!(registry.lang_names(), vec!["toy_fsm"]);
        assert!(registry.net_names().is_empty());
        assert!(registry.backends().is_empty());
        assert!(format!("{registry:?}").contains("toy_fsm"));
    }
}
