use crate::models::GameArtifact;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// Publishes generated documents to the directory served under `/games`
/// and mints the artifact that goes into conversation history.
#[derive(Clone)]
pub struct GameLibrary {
    dir: PathBuf,
    public_base_url: String,
}

impl GameLibrary {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Result<Self, String> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            format!("Failed to create games directory {}: {}", dir.display(), e)
        })?;
        Ok(GameLibrary {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Writes the document under a fresh id and returns the artifact with
    /// its public play URL.
    pub fn publish(&self, prompt: &str, html: &str) -> Result<GameArtifact, String> {
        let id = Uuid::new_v4().to_string();
        let path = self.dir.join(format!("{}.html", id));
        fs::write(&path, html).map_err(|e| {
            format!("Failed to write game file {}: {}", path.display(), e)
        })?;

        log::info!("Published game {} ({} bytes)", id, html.len());

        Ok(GameArtifact {
            url: format!("{}/games/{}.html", self.public_base_url, id),
            id,
            prompt: prompt.to_string(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_publish_writes_file_and_builds_url() {
        let dir = tempdir().unwrap();
        let library = GameLibrary::new(dir.path(), "https://bot.example.com").unwrap();

        let artifact = library.publish("snake game", "<html>snake</html>").unwrap();
        assert_eq!(
            artifact.url,
            format!("https://bot.example.com/games/{}.html", artifact.id)
        );
        assert_eq!(artifact.prompt, "snake game");

        let on_disk =
            std::fs::read_to_string(dir.path().join(format!("{}.html", artifact.id))).unwrap();
        assert_eq!(on_disk, "<html>snake</html>");
    }

    #[test]
    fn test_publish_ids_are_unique() {
        let dir = tempdir().unwrap();
        let library = GameLibrary::new(dir.path(), "http://localhost:3000").unwrap();

        let a = library.publish("a", "<html></html>").unwrap();
        let b = library.publish("b", "<html></html>").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let dir = tempdir().unwrap();
        let library = GameLibrary::new(dir.path(), "http://localhost:3000/").unwrap();

        let artifact = library.publish("p", "<html></html>").unwrap();
        assert!(artifact.url.starts_with("http://localhost:3000/games/"));
    }

    #[test]
    fn test_new_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("served").join("games");
        let library = GameLibrary::new(&nested, "http://localhost:3000").unwrap();

        library.publish("p", "<html></html>").unwrap();
        assert!(nested.exists());
    }
}
