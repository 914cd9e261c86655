use gallery_ref::ContentHash;
use log::trace;

use crate::store::Registration;
use crate::Database;

/// Registers each hash against its submission. A later registration of the
/// same hash replaces the earlier one.
pub fn insert_file_hashes(db: &mut Database, hashes: &[ContentHash], registration: &Registration) {
    for hash in hashes {
        if let Some(previous) = db.file_hashes.insert(hash.clone(), registration.clone()) {
            trace!(
                "file hash {} moved from message {} to {}",
                hash,
                previous.message_id,
                registration.message_id
            );
        }
    }
}
