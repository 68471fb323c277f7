//! Markdown content loaded from the filesystem.
//!
//! Posts live in `<root>/posts/<slug>.md` and pages in `<root>/pages/<slug>.md`
//! (`.mdx` is accepted too). Files are read on every request so edits show up
//! without a restart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::application::repos::{ContentError, ContentRepo};
use crate::domain::{
    pages::{ContentSlug, StaticPage},
    posts::{BlogPost, sort_newest_first},
};

const EXTENSIONS: [&str; 2] = ["md", "mdx"];

#[derive(Debug, Clone)]
pub struct FsContentStore {
    posts_dir: PathBuf,
    pages_dir: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            posts_dir: root.join("posts"),
            pages_dir: root.join("pages"),
        }
    }

    /// Read `<dir>/<slug>.<ext>` for the first extension that exists.
    async fn read_entry(
        &self,
        dir: &Path,
        slug: &str,
    ) -> Result<Option<(PathBuf, String)>, ContentError> {
        let Ok(slug) = ContentSlug::new(slug) else {
            return Ok(None);
        };

        for extension in EXTENSIONS {
            let path = dir.join(format!("{}.{extension}", slug.as_str()));
            match fs::read_to_string(&path).await {
                Ok(source) => return Ok(Some((path, source))),
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(ContentError::io(path, err)),
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl ContentRepo for FsContentStore {
    async fn list_posts(&self) -> Result<Vec<BlogPost>, ContentError> {
        let mut entries = match fs::read_dir(&self.posts_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    target = "folio::infra::content",
                    dir = %self.posts_dir.display(),
                    "posts directory does not exist"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(ContentError::io(&self.posts_dir, err)),
        };

        let mut posts = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| ContentError::io(&self.posts_dir, err))?
        {
            let path = entry.path();
            let Some(stem) = content_stem(&path) else {
                continue;
            };

            if ContentSlug::new(stem.as_str()).is_err() {
                warn!(
                    target = "folio::infra::content",
                    path = %path.display(),
                    "skipping post with an unusable file name"
                );
                continue;
            }

            let source = fs::read_to_string(&path)
                .await
                .map_err(|err| ContentError::io(&path, err))?;
            let post = BlogPost::from_source(stem, &source)
                .map_err(|err| ContentError::malformed(&path, err))?;
            posts.push(post);
        }

        sort_newest_first(&mut posts);
        debug!(
            target = "folio::infra::content",
            count = posts.len(),
            "loaded posts"
        );
        Ok(posts)
    }

    async fn find_post(&self, slug: &str) -> Result<Option<BlogPost>, ContentError> {
        let Some((path, source)) = self.read_entry(&self.posts_dir, slug).await? else {
            return Ok(None);
        };

        BlogPost::from_source(slug, &source)
            .map(Some)
            .map_err(|err| ContentError::malformed(path, err))
    }

    async fn find_page(&self, slug: &str) -> Result<Option<StaticPage>, ContentError> {
        let Some((path, source)) = self.read_entry(&self.pages_dir, slug).await? else {
            return Ok(None);
        };

        StaticPage::from_source(slug, &source)
            .map(Some)
            .map_err(|err| ContentError::malformed(path, err))
    }
}

fn content_stem(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !EXTENSIONS.contains(&extension) {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use time::macros::date;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write");
    }

    fn post_source(title: &str, date: &str) -> String {
        format!("---\ntitle: {title}\npublishedAt: {date}\nsummary: s\n---\nBody of {title}\n")
    }

    #[tokio::test]
    async fn lists_posts_newest_first_and_ignores_other_files() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "posts/first.md", &post_source("First", "2023-05-01"));
        write(dir.path(), "posts/second.mdx", &post_source("Second", "2024-02-10"));
        write(dir.path(), "posts/notes.txt", "not a post");
        write(dir.path(), "posts/Bad Name.md", &post_source("Bad", "2024-01-01"));

        let store = FsContentStore::new(dir.path());
        let posts = store.list_posts().await.expect("list");

        let slugs: Vec<_> = posts.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first"]);
        assert_eq!(posts[0].metadata.published_at, date!(2024 - 02 - 10));
    }

    #[tokio::test]
    async fn missing_posts_directory_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsContentStore::new(dir.path());
        assert!(store.list_posts().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn malformed_post_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "posts/broken.md", "---\ntitle: Broken\n---\nbody");

        let store = FsContentStore::new(dir.path());
        let err = store.list_posts().await.expect_err("missing date");
        assert!(matches!(err, ContentError::Malformed { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[tokio::test]
    async fn find_post_rejects_traversal_and_unknown_slugs() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "posts/hello.md", &post_source("Hello", "2024-01-01"));
        let store = FsContentStore::new(dir.path());

        assert!(store.find_post("hello").await.expect("find").is_some());
        assert!(store.find_post("missing").await.expect("find").is_none());
        assert!(store.find_post("../pages/about").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn find_page_reads_pages_directory() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "pages/about.md", "---\ntitle: About\n---\nHi there");
        let store = FsContentStore::new(dir.path());

        let page = store.find_page("about").await.expect("find").expect("page");
        assert_eq!(page.title, "About");
        assert_eq!(page.content.trim(), "Hi there");
    }
}
