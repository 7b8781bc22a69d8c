use std::path::{Path, PathBuf};

use article_comments::comments::SubmitOutcome;
use article_comments::config::Config;
use article_comments::db::Repository;
use article_comments::models::Post;
use article_comments::{App, AppError, Result};

const USAGE: &str = "Usage:
    article-comments show <id>
    article-comments meta <id>
    article-comments comments <id>
    article-comments comment <id> <text...>
    article-comments import <posts.json>";

/// Exit status for an article whose publish date is not set yet.
const EXIT_UNAVAILABLE: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show(String),
    Meta(String),
    Comments(String),
    Comment { article_id: String, text: String },
    Import(PathBuf),
}

fn parse_args(args: &[String]) -> Option<Command> {
    let (name, rest) = args.split_first()?;
    match (name.as_str(), rest) {
        ("show", [id]) => Some(Command::Show(id.clone())),
        ("meta", [id]) => Some(Command::Meta(id.clone())),
        ("comments", [id]) => Some(Command::Comments(id.clone())),
        ("comment", [id, text @ ..]) if !text.is_empty() => Some(Command::Comment {
            article_id: id.clone(),
            text: text.join(" "),
        }),
        ("import", [path]) => Some(Command::Import(PathBuf::from(path))),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_args(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = Config::load()?;
    let app = App::new(&config).await?;

    match run(&app, command).await {
        Err(err) => match exit_status(&err) {
            Some(code) => {
                eprintln!("{}", describe(&err));
                std::process::exit(code);
            }
            None => Err(err),
        },
        ok => ok,
    }
}

/// Errors that end the process with their own exit status instead of the
/// generic failure report.
fn exit_status(err: &AppError) -> Option<i32> {
    match err {
        AppError::InvalidTimestamp(_) => Some(EXIT_UNAVAILABLE),
        _ => None,
    }
}

fn describe(err: &AppError) -> String {
    match err {
        AppError::InvalidTimestamp(reason) => format!("Article is not available yet ({})", reason),
        other => other.to_string(),
    }
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Show(id) => {
            let page = app.open_article(&id).await?;
            println!("{}", page.article.title);
            println!("{}", page.article.display_date);
            if let Some(author) = &page.article.author {
                println!("by {}", author);
            }
            if !page.article.tags.is_empty() {
                println!("[{}]", page.article.tags.join(", "));
            }
            println!();
            println!("{}", page.article.description);
            println!();
            println!("{} comments", page.comments.len());
            for post in &page.more_posts {
                println!("  more: {} ({})", post.title, post.id);
            }
        }

        Command::Meta(id) => {
            let metadata = app.page_metadata(&id).await?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }

        Command::Comments(id) => {
            let form = app.comment_form(&id);
            form.load_comments().await?;
            for comment in form.comments() {
                println!("- {}", comment.comment);
            }
        }

        Command::Comment { article_id, text } => {
            let form = app.comment_form(&article_id);
            form.set_comment(text);

            match form.submit().await {
                SubmitOutcome::Submitted(comment) => {
                    println!("Comment {} added", comment.id);
                }
                SubmitOutcome::Invalid(err) => {
                    eprintln!("{}", err);
                }
                SubmitOutcome::Failed(_) | SubmitOutcome::Busy => {}
            }

            if let Some(error) = app.status().snapshot().error {
                eprintln!("Last error: {}", error.message);
            }
            println!("{} comments", form.comments().len());
        }

        Command::Import(path) => {
            // Import writes straight into the local database
            if app.config.store_url.is_some() {
                return Err(AppError::Config(
                    "import only works with the local database; unset store_url".to_string(),
                ));
            }
            let count = import_posts(&app.config.db_path, &path).await?;
            println!("Imported {} posts from {:?}", count, path);
        }
    }

    Ok(())
}

async fn import_posts(db_path: &str, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let posts: Vec<Post> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid post list in {}: {}", path.display(), e))?;
    let repository = Repository::new(db_path).await?;

    let count = posts.len();
    for post in posts {
        tracing::debug!("Importing post {}", post.id);
        repository.upsert_post(post).await?;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_args(&args(&["show", "42"])), Some(Command::Show("42".into())));
        assert_eq!(
            parse_args(&args(&["comment", "42", "nice", "post"])),
            Some(Command::Comment {
                article_id: "42".into(),
                text: "nice post".into(),
            })
        );
        assert_eq!(
            parse_args(&args(&["import", "posts.json"])),
            Some(Command::Import(PathBuf::from("posts.json")))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_args(&args(&[])), None);
        assert_eq!(parse_args(&args(&["comment", "42"])), None);
        assert_eq!(parse_args(&args(&["show"])), None);
        assert_eq!(parse_args(&args(&["frobnicate", "1"])), None);
    }

    #[test]
    fn test_unavailable_article_exits_non_zero() {
        let err = AppError::InvalidTimestamp("missing seconds".to_string());
        assert_eq!(exit_status(&err), Some(EXIT_UNAVAILABLE));
        assert_ne!(EXIT_UNAVAILABLE, 0);
        assert_eq!(describe(&err), "Article is not available yet (missing seconds)");

        assert_eq!(exit_status(&AppError::ArticleNotFound("42".to_string())), None);
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("posts.db");
        let missing = dir.path().join("missing.json");

        let err = import_posts(db_path.to_str().unwrap(), &missing).await.unwrap_err();
        assert!(matches!(err, AppError::Other(_)));
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[tokio::test]
    async fn test_import_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("posts.db");
        let file = dir.path().join("posts.json");
        std::fs::write(&file, "{ not a list").unwrap();

        let err = import_posts(db_path.to_str().unwrap(), &file).await.unwrap_err();
        assert!(matches!(err, AppError::Other(_)));
        assert!(err.to_string().starts_with("Invalid post list"));
    }
}
