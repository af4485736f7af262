//! Where generated source goes.
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Error;

pub const OUTPUT_EXTENSION: &str = "ts";

#[derive(Debug, Clone)]
pub enum OutputSink {
    /// `<dir>/<title>.ts`, creating `dir` as needed
    Directory(PathBuf),
    Stdout,
}

impl OutputSink {
    /// Returns the written path, `None` for stdout.
    pub async fn write(&self, title: &str, source: &str) -> Result<Option<PathBuf>, Error> {
        match self {
            OutputSink::Directory(dir) => {
                let file_name = file_name_for(title)?;
                tokio::fs::create_dir_all(dir).await.map_err(Error::io(dir))?;
                let path = dir.join(file_name);
                tokio::fs::write(&path, source).await.map_err(Error::io(&path))?;
                Ok(Some(path))
            }
            OutputSink::Stdout => {
                print!("{source}");
                Ok(None)
            }
        }
    }
}

/// The declared `title`, which names the output file. Required.
pub fn schema_title<'a>(collection: &str, schema: &'a Value) -> Result<&'a str, Error> {
    schema
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MissingTitle { collection: collection.to_string() })
}

/// `<title>.ts`, provided the title is a single plain file name.
fn file_name_for(title: &str) -> Result<String, Error> {
    let plain = !title.contains(['/', '\\'])
        && Path::new(title).file_name().is_some_and(|x| x == title);
    if !plain {
        return Err(Error::UnsafeTitle { title: title.to_string() });
    }
    Ok(format!("{title}.{OUTPUT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_is_required() {
        assert_eq!(schema_title("c", &json!({"title": "User"})).unwrap(), "User");
        assert!(matches!(schema_title("c", &json!({})), Err(Error::MissingTitle { .. })));
        assert!(matches!(schema_title("c", &json!({"title": 3})), Err(Error::MissingTitle { .. })));
    }

    #[test]
    fn titles_must_be_plain_file_names() {
        assert_eq!(file_name_for("User").unwrap(), "User.ts");
        for title in ["../escaped", "a/b", "a\\b", "..", ".", ""] {
            assert!(
                matches!(file_name_for(title), Err(Error::UnsafeTitle { .. })),
                "{title:?} accepted"
            );
        }
    }

    #[tokio::test]
    async fn title_cannot_leave_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::Directory(dir.path().join("out"));
        let err = sink.write("../escaped", "x").await.unwrap_err();
        assert!(matches!(err, Error::UnsafeTitle { ref title } if title == "../escaped"));
        assert!(!dir.path().join("escaped.ts").exists());
    }

    #[tokio::test]
    async fn writes_into_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::Directory(dir.path().join("a/b"));
        let path = sink.write("User", "export interface User {}\n").await.unwrap().unwrap();
        assert_eq!(path, dir.path().join("a/b/User.ts"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "export interface User {}\n");
    }
}
