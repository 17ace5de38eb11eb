//! The set of response kinds the classifier may produce.

use crate::chain::Chain;
use crate::responses::ResponseKind;

/// A registered kind together with where its children live in a fetched response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindDescriptor {
    pub kind: ResponseKind,
    /// Tried in order; the first chain that reaches a sequence wins.
    pub children_chains: Vec<Chain>,
}

impl KindDescriptor {
    pub fn new(kind: ResponseKind) -> Self {
        Self {
            kind,
            children_chains: kind.default_children_chains(),
        }
    }
}

/// Membership of response kinds, populated once at startup.
///
/// The registry imposes no trial order of its own; the classifier decides that.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<KindDescriptor>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a kind. Registering a kind twice replaces its descriptor.
    pub fn register(&mut self, descriptor: KindDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.kind == descriptor.kind)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// Overrides the children chains of `kind`, registering it if needed.
    pub fn with_children_chains(mut self, kind: ResponseKind, chains: Vec<Chain>) -> Self {
        self.register(KindDescriptor {
            kind,
            children_chains: chains,
        });
        self
    }

    pub fn all_kinds(&self) -> Vec<ResponseKind> {
        self.descriptors.iter().map(|d| d.kind).collect()
    }

    pub fn contains(&self, kind: ResponseKind) -> bool {
        self.descriptors.iter().any(|d| d.kind == kind)
    }

    pub fn children_chains(&self, kind: ResponseKind) -> &[Chain] {
        self.descriptors
            .iter()
            .find(|d| d.kind == kind)
            .map(|d| d.children_chains.as_slice())
            .unwrap_or(&[])
    }
}

/// The standard kinds: endpoint, playlist and track.
pub fn default_registry() -> Registry {
    let mut registry = Registry::empty();
    for kind in ResponseKind::ALL {
        registry.register(KindDescriptor::new(kind));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_all_kinds() {
        let registry = default_registry();
        assert_eq!(registry.all_kinds(), ResponseKind::ALL.to_vec());
        assert_eq!(
            registry.children_chains(ResponseKind::Endpoint),
            &[chain!["contents", "content", "contents", "items"]]
        );
        assert!(registry.children_chains(ResponseKind::Track).is_empty());
    }

    #[test]
    fn test_register_replaces_existing_kind() {
        let registry =
            default_registry().with_children_chains(ResponseKind::Playlist, vec![chain!["items"]]);
        assert_eq!(registry.all_kinds().len(), 3);
        assert_eq!(
            registry.children_chains(ResponseKind::Playlist),
            &[chain!["items"]]
        );
    }

    #[test]
    fn test_unregistered_kind_has_no_chains() {
        let mut registry = Registry::empty();
        registry.register(KindDescriptor::new(ResponseKind::Track));
        assert!(!registry.contains(ResponseKind::Endpoint));
        assert!(registry.children_chains(ResponseKind::Endpoint).is_empty());
    }
}
