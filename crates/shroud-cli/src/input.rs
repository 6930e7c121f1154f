//! Input helpers shared by subcommands.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Read a file, or stdin when the path is `-`.
pub fn read_source(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse JSON from a file or stdin.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = read_source(path)?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"amount": 500000}"#).unwrap();

        let value: Value = read_json(&path).unwrap();
        assert_eq!(value, json!({"amount": 500_000}));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_json::<Value>(Path::new("/nonexistent/payload.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/payload.json"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{amount").unwrap();

        assert!(read_json::<Value>(&path).is_err());
    }
}
