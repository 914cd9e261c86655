use gallery_ref::{Version, VersionChainKey};
use log::debug;

use crate::Database;

/// Picks the version for a new submission in the chain and appends it.
///
/// The first submission of a chain is `1.0`; later ones are one major above
/// the highest version already recorded for the chain.
pub fn resolve_version(db: &mut Database, key: &VersionChainKey, message_id: &str) -> Version {
    let existing = db.project_versions.get(key).filter(|chain| !chain.is_empty());

    let version = match existing {
        Some(chain) => {
            let latest = chain
                .iter()
                .filter_map(|id| db.submissions.get(id))
                .map(|submission| submission.version)
                .max()
                .unwrap_or(Version::FIRST);
            latest.next()
        }
        None => Version::FIRST,
    };

    debug!("chain {} gets message {} as {}", key, message_id, version);
    db.project_versions
        .entry(key.clone())
        .or_default()
        .push(message_id.to_string());

    version
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_ref::TitleFingerprint;

    #[test]
    fn test_new_chain_starts_at_one() {
        let mut db = Database::default();
        let key = VersionChainKey::new("42", &TitleFingerprint::from_title("Game"));

        assert_eq!(resolve_version(&mut db, &key, "1"), Version::FIRST);
        assert_eq!(db.project_versions[&key], vec!["1".to_string()]);
    }

    #[test]
    fn test_unresolvable_chain_defaults_to_two() {
        let mut db = Database::default();
        let key = VersionChainKey::new("42", &TitleFingerprint::from_title("Game"));
        db.project_versions.insert(key.clone(), vec!["missing".to_string()]);

        assert_eq!(resolve_version(&mut db, &key, "2").to_string(), "2.0");
        assert_eq!(db.project_versions[&key].len(), 2);
    }
}
