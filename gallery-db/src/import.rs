use gallery_msg::{Export, SourcedMsg};
use gallery_ref::{ContentHash, ProjectId, TitleFingerprint, Version, VersionChainKey};
use itertools::Itertools;
use log::{debug, info, trace};
use std::{fmt, fs::File, io::BufReader, path::Path};

use crate::store::*;
use crate::validate::{validate_artwork_post, validate_project_post, Rejection};
use crate::{Database, Error};

/// What happened to one message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Imported { submission_type: SubmissionType, votes: u64 },
    Skipped(Rejection),
    /// The channel is neither a project nor an artwork channel.
    Ignored,
    Duplicate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub projects: u64,
    pub artwork: u64,
    pub votes: u64,
    pub skipped: u64,
    pub ignored: u64,
    pub duplicates: u64,
}

impl ImportStats {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Imported {
                submission_type,
                votes,
            } => {
                match submission_type {
                    SubmissionType::Project => self.projects += 1,
                    SubmissionType::Artwork => self.artwork += 1,
                }
                self.votes += votes;
            }
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::Duplicate => self.duplicates += 1,
        }
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Projects imported: {}", self.projects)?;
        writeln!(f, "Artwork imported:  {}", self.artwork)?;
        writeln!(f, "Votes registered:  {}", self.votes)?;
        write!(f, "Skipped messages:  {}", self.skipped)?;
        if self.ignored > 0 {
            write!(f, "\nIgnored (unknown channel): {}", self.ignored)?;
        }
        if self.duplicates > 0 {
            write!(f, "\nDuplicate messages: {}", self.duplicates)?;
        }
        Ok(())
    }
}

/// Reads a chat export and tags its messages with `channel_name`.
pub fn load_export<P: AsRef<Path>>(path: P, channel_name: &str) -> Result<Vec<SourcedMsg>, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let export = Export::from_reader(BufReader::new(file))?;
    info!(
        "loaded {} messages for #{} from {}",
        export.messages.len(),
        channel_name,
        path.display()
    );
    Ok(export.tag(channel_name))
}

/// Merges both channels into one chronological list. The sort is stable, so
/// messages with equal timestamps keep artwork ahead of projects.
pub fn merge_sorted(artwork: Vec<SourcedMsg>, projects: Vec<SourcedMsg>) -> Vec<SourcedMsg> {
    artwork
        .into_iter()
        .chain(projects)
        .sorted_by(|a, b| a.msg.timestamp.cmp(&b.msg.timestamp))
        .collect()
}

impl Database {
    /// Imports every message in order and returns the run's counts.
    pub fn import(&mut self, msgs: &[SourcedMsg]) -> ImportStats {
        self.import_with(msgs, |_, _| {})
    }

    /// Like `import`, calling `on_item` after each message is handled.
    pub fn import_with<F>(&mut self, msgs: &[SourcedMsg], mut on_item: F) -> ImportStats
    where
        F: FnMut(&SourcedMsg, &Outcome),
    {
        let mut stats = ImportStats::default();
        for sourced in msgs {
            let outcome = self.append_item(sourced);
            stats.record(&outcome);
            on_item(sourced, &outcome);
        }
        stats
    }

    /// Classifies, validates and stores a single message. A message id seen
    /// before is reported as a duplicate and changes nothing.
    pub fn append_item(&mut self, sourced: &SourcedMsg) -> Outcome {
        let msg = &sourced.msg;

        let submission_type = match SubmissionType::from_channel_name(&sourced.channel_name) {
            Some(submission_type) => submission_type,
            None => {
                trace!("ignore message {} from #{}", msg.id, sourced.channel_name);
                return Outcome::Ignored;
            }
        };

        if self.submissions.contains_key(&msg.id) {
            debug!("message {} already imported", msg.id);
            return Outcome::Duplicate;
        }

        let accepted = match submission_type {
            SubmissionType::Project => self.accept_project(sourced),
            SubmissionType::Artwork => self.accept_artwork(sourced),
        };
        let mut submission = match accepted {
            Ok(submission) => submission,
            Err(rejection) => {
                debug!("skip message {}: {}", msg.id, rejection);
                return Outcome::Skipped(rejection);
            }
        };

        let registration = Registration {
            author_id: msg.author.id.clone(),
            message_id: msg.id.clone(),
            project_id: submission.project_id.clone(),
        };
        insert_file_hashes(self, &submission.content_hashes, &registration);
        insert_links(self, &submission.media_links, &registration);

        let tally = aggregate_reactions(&msg.reactions);
        let votes = tally.votes.total();
        if votes > 0 {
            submission.last_voted_at = Some(msg.timestamp.clone());
        }
        submission.votes = tally.votes;
        submission.voters = tally.voters;

        let project_id = submission.project_id.clone();
        insert_submission(self, submission);
        insert_user_project(self, &msg.author.id, &project_id);

        Outcome::Imported {
            submission_type,
            votes,
        }
    }

    fn accept_project(&mut self, sourced: &SourcedMsg) -> Result<Submission, Rejection> {
        let msg = &sourced.msg;
        let post = validate_project_post(&msg.content, &msg.attachments)?;

        let fingerprint = TitleFingerprint::from_title(&post.title);
        let project_id = ProjectId::for_project(&msg.author.id, &fingerprint);
        let chain_key = VersionChainKey::new(&msg.author.id, &fingerprint);
        let version = resolve_version(self, &chain_key, &msg.id);

        let thumbnail_url = msg
            .attachments
            .iter()
            .find(|attachment| attachment.is_image())
            .map(|attachment| attachment.url.clone());

        let mut submission = new_submission(sourced, project_id, SubmissionType::Project, version);
        submission.title = Some(post.title);
        submission.description = Some(post.description);
        submission.media_links = post.media_links;
        submission.thumbnail_url = thumbnail_url;
        Ok(submission)
    }

    fn accept_artwork(&self, sourced: &SourcedMsg) -> Result<Submission, Rejection> {
        let msg = &sourced.msg;
        let post = validate_artwork_post(&msg.attachments)?;

        let project_id = ProjectId::for_artwork(&msg.author.id, &msg.id);

        let mut submission =
            new_submission(sourced, project_id, SubmissionType::Artwork, Version::FIRST);
        submission.media_links = msg
            .attachments
            .iter()
            .map(|attachment| attachment.url.clone())
            .collect();
        submission.thumbnail_url = Some(post.thumbnail_url);
        Ok(submission)
    }
}

fn new_submission(
    sourced: &SourcedMsg,
    project_id: ProjectId,
    submission_type: SubmissionType,
    version: Version,
) -> Submission {
    let msg = &sourced.msg;
    Submission {
        project_id,
        message_id: msg.id.clone(),
        author_id: msg.author.id.clone(),
        submission_type,
        version,
        title: None,
        description: None,
        media_links: Vec::new(),
        thumbnail_url: None,
        content_hashes: msg
            .attachments
            .iter()
            .map(|attachment| ContentHash::from_url(&attachment.url))
            .collect(),
        votes: Votes::default(),
        voters: Default::default(),
        thread_message_count: 0,
        thread_participants: Vec::new(),
        created_at: msg.timestamp.clone(),
        updated_at: msg.timestamp.clone(),
        last_voted_at: None,
        deleted: false,
        channel_id: sourced.channel_id.clone(),
        linked_submissions: Vec::new(),
    }
}
