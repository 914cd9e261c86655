use gallery_ref::ProjectId;

use crate::Database;

/// Appends the project to the author's list unless it is already there.
pub fn insert_user_project(db: &mut Database, author_id: &str, project_id: &ProjectId) {
    let projects = db.user_projects.entry(author_id.to_string()).or_default();
    if !projects.contains(project_id) {
        projects.push(project_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_ref::TitleFingerprint;

    #[test]
    fn test_no_duplicates_and_order_kept() {
        let mut db = Database::default();
        let game = ProjectId::for_project("42", &TitleFingerprint::from_title("Game"));
        let art = ProjectId::for_artwork("42", "1000");

        insert_user_project(&mut db, "42", &game);
        insert_user_project(&mut db, "42", &art);
        insert_user_project(&mut db, "42", &game);

        assert_eq!(db.user_projects["42"], vec![game, art]);
    }
}
