//! Concrete collaborators: browser APIs, Supabase, link previews

pub mod chrome;
pub mod link_preview;
pub mod supabase;

use std::rc::Rc;

use crate::config::Config;
use crate::gateway::PersistenceGateway;
use crate::session::SessionHolder;

pub use chrome::{ChromeSessionStore, ChromeTabs};
pub use link_preview::LinkPreviewClient;
pub use supabase::SupabaseClient;

pub type Backend = SupabaseClient<ChromeSessionStore>;

/// Everything the popup talks to, built once from the config.
pub struct Services {
    pub config: Config,
    pub session: SessionHolder<Backend>,
    pub gateway: PersistenceGateway<Backend>,
    pub metadata: Rc<LinkPreviewClient>,
    pub tabs: ChromeTabs,
}

impl Services {
    pub fn new(config: Config) -> Services {
        let backend = Rc::new(SupabaseClient::new(&config, ChromeSessionStore));
        Services {
            session: SessionHolder::new(Rc::clone(&backend)),
            gateway: PersistenceGateway::new(backend),
            metadata: Rc::new(LinkPreviewClient::new(config.metadata_endpoint.clone())),
            tabs: ChromeTabs,
            config,
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        self.session == other.session
    }
}
