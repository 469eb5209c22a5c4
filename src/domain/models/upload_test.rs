use std::path::Path;

use anyhow::Result;
use test_utils::scratch_dir;
use tokio::fs;

use super::mime_for_path;
use super::mime_matches;
use super::FileUpload;

#[test]
fn it_guesses_mime_types() {
    assert_eq!(mime_for_path(Path::new("cat.PNG")), Some("image/png"));
    assert_eq!(mime_for_path(Path::new("clip.mov")), Some("video/quicktime"));
    assert_eq!(mime_for_path(Path::new("talk.mp3")), Some("audio/mpeg"));
    assert_eq!(mime_for_path(Path::new("archive.rar")), None);
    assert_eq!(mime_for_path(Path::new("README")), None);
}

#[test]
fn it_matches_wildcards() {
    assert!(mime_matches("video/*", "video/quicktime"));
    assert!(mime_matches("image/png", "IMAGE/PNG"));
    assert!(!mime_matches("video/*", "audio/mpeg"));
    assert!(!mime_matches("video/*", "video"));
    assert!(!mime_matches("image/png", "image/jpeg"));
}

#[tokio::test]
async fn it_reads_uploads_from_disk() -> Result<()> {
    let dir = scratch_dir("upload");
    fs::create_dir_all(&dir).await?;

    let known = dir.join("holiday.mp4");
    fs::write(&known, vec![0, 1, 2]).await?;
    assert_eq!(
        FileUpload::from_path(&known).await?,
        FileUpload::new("holiday.mp4", "video/mp4", vec![0, 1, 2])
    );

    let unknown = dir.join("data.bin");
    fs::write(&unknown, vec![9]).await?;
    assert_eq!(
        FileUpload::from_path(&unknown).await?.mime,
        "application/octet-stream"
    );

    let missing = FileUpload::from_path(&dir.join("missing.png")).await;
    assert!(missing.is_err());

    fs::remove_dir_all(&dir).await?;
    return Ok(());
}
