//! The capabilities children resolution needs: classification and transport.

use crate::classifier::Classifier;
use crate::client::Transport;

/// Bundles the classifier and the network transport handed to lazy nodes.
pub struct Session {
    classifier: Classifier,
    transport: Box<dyn Transport>,
}

impl Session {
    pub fn new(classifier: Classifier, transport: Box<dyn Transport>) -> Self {
        Self {
            classifier,
            transport,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
