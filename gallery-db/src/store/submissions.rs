use log::trace;

use crate::store::Submission;
use crate::Database;

/// Inserts a submission keyed by its message id. Callers check for an
/// already imported message first, see `Database::append_item`.
pub fn insert_submission(db: &mut Database, submission: Submission) {
    trace!(
        "insert {:?} {} for message {}",
        submission.submission_type,
        submission.project_id,
        submission.message_id
    );
    db.submissions
        .insert(submission.message_id.clone(), submission);
}
