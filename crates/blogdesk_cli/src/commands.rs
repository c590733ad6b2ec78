//! Command execution against an article service.
//!
//! Plays the editing-UI role: reads drafts, runs form-level checks through
//! an `EditingSession`, then calls the service and prints results.

use crate::args::{Command, USAGE};
use blogdesk_core::{
    core_version, ping, ArticleRecord, ArticleService, ArticleStore, ArticleValidationError,
    EditingSession, ServiceError, StoreError, TagError,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Draft article as read from a JSON input file.
///
/// Every field is optional so form-level validation can name what is
/// missing; `date` defaults to today.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleDraft {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub date: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub content: String,
    pub excerpt: Option<String>,
}

impl ArticleDraft {
    /// Fills an editing session, adding tags one by one.
    pub fn into_session(self, today: &str) -> Result<EditingSession, TagError> {
        let mut session = EditingSession::new(self.date.unwrap_or_else(|| today.to_string()));
        session.id = self.id.filter(|id| !id.trim().is_empty());
        session.title = self.title;
        session.author = self.author;
        session.category = self.category;
        session.content = self.content;
        session.excerpt = self.excerpt.unwrap_or_default();
        for tag in &self.tags {
            session.add_tag(tag)?;
        }
        Ok(session)
    }
}

/// Per-invocation inputs that are not part of the command itself.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub out_dir: PathBuf,
    pub now: DateTime<Utc>,
}

impl RunContext {
    fn today(&self) -> String {
        self.now.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug)]
pub enum CliError {
    ReadDraft {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseDraft {
        path: PathBuf,
        source: serde_json::Error,
    },
    Tag(TagError),
    Validation(ArticleValidationError),
    Service(ServiceError),
    NotFound(String),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadDraft { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::ParseDraft { path, source } => {
                write!(f, "`{}` is not a valid article draft: {source}", path.display())
            }
            Self::Tag(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "article not found: {id}"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadDraft { source, .. } => Some(source),
            Self::ParseDraft { source, .. } => Some(source),
            Self::Tag(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Output(err) => Some(err),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Service(ServiceError::Store(value))
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

/// Runs one command and prints its result to `out`.
pub fn execute<S, W>(
    service: &mut ArticleService<S>,
    command: &Command,
    ctx: &RunContext,
    out: &mut W,
) -> Result<(), CliError>
where
    S: ArticleStore,
    W: Write,
{
    match command {
        Command::Help => writeln!(out, "{USAGE}")?,
        Command::Ping => writeln!(out, "blogdesk_core ping={} version={}", ping(), core_version())?,
        Command::Save(path) => {
            let record = read_draft(path, &ctx.today())?;
            let id = service.save(&record)?;
            writeln!(out, "saved {id}")?;
        }
        Command::Publish(path) => {
            let record = read_draft(path, &ctx.today())?;
            let outcome = service.save_and_generate(&record, &ctx.out_dir)?;
            writeln!(out, "published {} -> {}", outcome.id, outcome.path.display())?;
        }
        Command::List => write_listing(out, &service.list())?,
        Command::Search(keyword) => write_listing(out, &service.search(keyword))?,
        Command::Show(id) => {
            let record = find(service, id)?;
            let json = serde_json::to_string_pretty(&record)
                .map_err(|err| CliError::Service(ServiceError::Export(err)))?;
            writeln!(out, "{json}")?;
        }
        Command::Render(id) => {
            let record = find(service, id)?;
            write!(out, "{}", service.preview(&record))?;
        }
        Command::Delete(id) => {
            service.delete(id)?;
            writeln!(out, "deleted {id}")?;
        }
        Command::Export => {
            let path = service.write_export(&ctx.out_dir, ctx.now)?;
            writeln!(out, "exported {}", path.display())?;
        }
    }
    Ok(())
}

fn read_draft(path: &Path, today: &str) -> Result<ArticleRecord, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadDraft {
        path: path.to_path_buf(),
        source,
    })?;
    let draft: ArticleDraft =
        serde_json::from_str(&raw).map_err(|source| CliError::ParseDraft {
            path: path.to_path_buf(),
            source,
        })?;
    let session = draft.into_session(today).map_err(CliError::Tag)?;
    session.to_record().map_err(CliError::Validation)
}

fn find<S: ArticleStore>(service: &ArticleService<S>, id: &str) -> Result<ArticleRecord, CliError> {
    service
        .get(id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))
}

fn write_listing<W: Write>(out: &mut W, articles: &[ArticleRecord]) -> std::io::Result<()> {
    if articles.is_empty() {
        return writeln!(out, "no articles");
    }
    for article in articles {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            article.id.as_deref().unwrap_or("-"),
            article.date,
            article.category,
            article.title
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{execute, CliError, RunContext};
    use crate::args::Command;
    use blogdesk_core::{ArticleService, InMemoryArticleStore, TagError};
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn context(out_dir: &Path) -> RunContext {
        RunContext {
            out_dir: out_dir.to_path_buf(),
            now: Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap(),
        }
    }

    fn run(
        service: &mut ArticleService<InMemoryArticleStore>,
        command: Command,
        ctx: &RunContext,
    ) -> Result<String, CliError> {
        let mut out = Vec::new();
        execute(service, &command, ctx, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn write_draft(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn publish_defaults_date_and_writes_page() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir.path().join("site"));
        let draft = write_draft(
            dir.path(),
            "post.json",
            r#"{"title":"Hello","author":"Alice","category":"Tech","tags":["rust"],"content":"<p>hi</p>"}"#,
        );
        let mut service = ArticleService::new(InMemoryArticleStore::new());

        let printed = run(&mut service, Command::Publish(draft), &ctx).unwrap();
        assert!(printed.starts_with("published article_"));

        let html = std::fs::read_to_string(dir.path().join("site").join("hello.html")).unwrap();
        assert!(html.contains("2024年06月05日"));

        let listing = run(&mut service, Command::List, &ctx).unwrap();
        assert!(listing.contains("\t2024-06-05\tTech\tHello"));
    }

    #[test]
    fn save_reports_tag_and_field_errors() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut service = ArticleService::new(InMemoryArticleStore::new());

        let duplicated = write_draft(
            dir.path(),
            "dup.json",
            r#"{"title":"T","author":"A","category":"C","tags":["x","x"],"content":"c"}"#,
        );
        let err = run(&mut service, Command::Save(duplicated), &ctx).unwrap_err();
        assert!(matches!(err, CliError::Tag(TagError::Duplicate(_))));

        let untitled = write_draft(
            dir.path(),
            "untitled.json",
            r#"{"author":"A","category":"C","content":"c"}"#,
        );
        let err = run(&mut service, Command::Save(untitled), &ctx).unwrap_err();
        assert_eq!(err.to_string(), "required field `title` is empty");
        assert!(service.list().is_empty());
    }

    #[test]
    fn save_assigns_fresh_id_when_draft_id_is_blank() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut service = ArticleService::new(InMemoryArticleStore::new());
        let blank = write_draft(
            dir.path(),
            "blank.json",
            r#"{"id":"  ","title":"T","author":"A","category":"C","content":"c"}"#,
        );

        let first = run(&mut service, Command::Save(blank.clone()), &ctx).unwrap();
        let second = run(&mut service, Command::Save(blank), &ctx).unwrap();
        assert!(first.starts_with("saved article_"));
        assert_ne!(first, second);
        assert_eq!(service.list().len(), 2);
    }

    #[test]
    fn show_and_delete_handle_absent_ids() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut service = ArticleService::new(InMemoryArticleStore::new());

        let err = run(&mut service, Command::Show("article_nope".to_string()), &ctx).unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));

        let printed = run(&mut service, Command::Delete("article_nope".to_string()), &ctx).unwrap();
        assert_eq!(printed, "deleted article_nope\n");
        assert_eq!(run(&mut service, Command::List, &ctx).unwrap(), "no articles\n");
    }
}
