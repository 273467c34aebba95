use std::path::Path;

use common::error::AppError;
use serde::Serialize;

/// Writes the value as pretty JSON, replacing whatever the file held before.
pub async fn write_qa_log<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn overwrites_previous_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("qa_log.json");

        write_qa_log(&path, &json!({"run": 1})).await.expect("first write");
        write_qa_log(&path, &json!({"run": 2})).await.expect("second write");

        let written: Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.expect("read")).expect("json");
        assert_eq!(written, json!({"run": 2}));
    }
}
