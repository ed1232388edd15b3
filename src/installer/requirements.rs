//! Python requirement files

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Requirement lines of `path`, or `None` if the file does not exist.
///
/// Blank lines and `#` comments are dropped, as are trailing inline comments.
pub fn read_requirements(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(parse_requirements(&text)))
}

pub fn parse_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| match line.find(" #") {
            Some(i) => &line[..i],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_requirements() {
        let text = "# deps\nphonenumbers==8.13\n\n  xlrd  # legacy\n#pandas\n";
        assert_eq!(parse_requirements(text), vec!["phonenumbers==8.13", "xlrd"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_requirements(&dir.path().join("requirements.txt")).unwrap(), None);
    }

    #[test]
    fn test_comment_only_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "# nothing yet\n").unwrap();
        assert_eq!(read_requirements(&path).unwrap(), Some(vec![]));
    }
}
