use log::trace;

use crate::store::Registration;
use crate::Database;

/// Registers each raw media link against its submission, last writer wins.
pub fn insert_links(db: &mut Database, links: &[String], registration: &Registration) {
    for link in links {
        if let Some(previous) = db.link_registry.insert(link.clone(), registration.clone()) {
            trace!(
                "link {} moved from message {} to {}",
                link,
                previous.message_id,
                registration.message_id
            );
        }
    }
}
