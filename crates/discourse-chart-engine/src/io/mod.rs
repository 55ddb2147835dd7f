use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const NOTES_SEPARATOR: &str =
    "**********************************************************************";

/// Read the plain text to be charted
pub fn read_text_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Append row notes rescued from a cleared chart, under a separator and a timestamp header.
///
/// Does nothing when `notes` is empty.
pub fn append_recovered_notes(path: &Path, notes: &[String]) -> Result<(), IoError> {
    append_recovered_notes_at(path, notes, Local::now())
}

pub(crate) fn append_recovered_notes_at(
    path: &Path,
    notes: &[String],
    when: DateTime<Local>,
) -> Result<(), IoError> {
    if notes.is_empty() {
        return Ok(());
    }

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file)?;
    writeln!(file, "{NOTES_SEPARATOR}")?;
    writeln!(file, "{}", when.format("%Y-%m-%d %-I:%M %p"))?;
    for note in notes {
        writeln!(file, "{note}")?;
    }
    log::info!("Saved {} notes from cleared chart rows to {}", notes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn afternoon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn test_read_text_file_success() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("story.txt");
        fs::write(&path, "Once upon a time.").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "Once upon a time.");
    }

    #[test]
    fn test_read_text_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.txt");

        let result = read_text_file(&path);

        assert!(matches!(result, Err(IoError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_notes_written_under_timestamp_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("SavedNotes.txt");

        append_recovered_notes_at(
            &path,
            &["first note".to_string(), "second note".to_string()],
            afternoon(),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("\n{NOTES_SEPARATOR}\n2024-03-09 2:05 PM\nfirst note\nsecond note\n")
        );
    }

    #[test]
    fn test_notes_appended_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("SavedNotes.txt");
        fs::write(&path, "older notes\n").unwrap();

        append_recovered_notes_at(&path, &["newer".to_string()], afternoon()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("older notes\n\n"));
        assert!(content.ends_with("newer\n"));
    }

    #[test]
    fn test_no_notes_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("SavedNotes.txt");

        append_recovered_notes(&path, &[]).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project").join("charts").join("SavedNotes.txt");

        append_recovered_notes(&path, &["kept".to_string()]).unwrap();

        assert!(path.exists());
    }
}
