// Attachment updates: resolve each archived filename to a drive file in the
// chosen folder and write its alt text, one attachment at a time.

use anyhow::Result;
use tracing::{debug, warn};

use crate::api::{ApiClient, Folder};
use crate::error::MigrateError;
use crate::outbox::Attachment;

/// What to do when an attachment has no matching file in the folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MissingFilePolicy {
    /// Stop the whole run with an error.
    #[default]
    Abort,
    /// Warn, leave the attachment alone and carry on.
    Skip,
}

/// Result of handling a single attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Updated { file_id: String },
    Missing,
}

/// Totals of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub updated: usize,
    pub skipped: Vec<String>,
}

/// Look `attachment` up by name in `folder` and set the first match's
/// comment to its alt text.
pub async fn resolve_and_update(
    client: &ApiClient,
    folder: &Folder,
    attachment: &Attachment,
) -> Result<Resolution> {
    let files = client.find_files(&attachment.filename, &folder.id).await?;
    let Some(file) = files.into_iter().next() else {
        return Ok(Resolution::Missing);
    };
    client
        .update_file_comment(&file.id, &attachment.alt_text)
        .await?;
    debug!(filename = %attachment.filename, file_id = %file.id, "updated alt text");
    Ok(Resolution::Updated { file_id: file.id })
}

/// Update every attachment in order. `on_progress` runs after each
/// attachment has been handled.
pub async fn update_attachments<F>(
    client: &ApiClient,
    folder: &Folder,
    attachments: &[Attachment],
    policy: MissingFilePolicy,
    mut on_progress: F,
) -> Result<UpdateReport>
where
    F: FnMut(&Attachment),
{
    let mut report = UpdateReport::default();
    for attachment in attachments {
        match resolve_and_update(client, folder, attachment).await? {
            Resolution::Updated { .. } => report.updated += 1,
            Resolution::Missing => match policy {
                MissingFilePolicy::Abort => {
                    return Err(MigrateError::FileNotFound {
                        filename: attachment.filename.clone(),
                        folder: folder.display_path().to_string(),
                    }
                    .into());
                }
                MissingFilePolicy::Skip => {
                    warn!(
                        filename = %attachment.filename,
                        folder = folder.display_path(),
                        "no matching drive file, skipping"
                    );
                    report.skipped.push(attachment.filename.clone());
                }
            },
        }
        on_progress(attachment);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn folder() -> Folder {
        Folder {
            id: "photos".into(),
            name: "Photos".into(),
            path: Some("Drive > Photos".into()),
        }
    }

    fn attachment(filename: &str, alt_text: &str) -> Attachment {
        Attachment {
            filename: filename.into(),
            alt_text: alt_text.into(),
        }
    }

    async fn mount_file(server: &MockServer, name: &str, id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/drive/files/find"))
            .and(body_partial_json(json!({ "name": name, "folderId": "photos" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": id, "name": name, "comment": null }
            ])))
            .mount(server)
            .await;
    }

    async fn server_with_files(files: &[(&str, &str)]) -> MockServer {
        let server = MockServer::start().await;
        for (name, id) in files {
            mount_file(&server, name, id).await;
        }
        Mock::given(method("POST"))
            .and(path("/api/drive/files/find"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .with_priority(10)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/drive/files/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        server
    }

    /// (endpoint, body) of every request the server saw, in arrival order.
    async fn calls(server: &MockServer) -> Vec<(String, Value)> {
        server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .map(|r| {
                let endpoint = r.url.path().trim_start_matches("/api/").to_string();
                (endpoint, serde_json::from_slice(&r.body).unwrap())
            })
            .collect()
    }

    #[tokio::test]
    async fn updates_each_attachment_in_archive_order() {
        let server = server_with_files(&[("a.png", "fa"), ("b.png", "fb"), ("c.png", "fc")]).await;
        let api = ApiClient::new(server.uri(), "t").unwrap();
        let attachments = vec![
            attachment("b.png", "second"),
            attachment("a.png", "first"),
            attachment("c.png", ""),
        ];
        let mut progressed = Vec::new();

        let report = update_attachments(
            &api,
            &folder(),
            &attachments,
            MissingFilePolicy::Abort,
            |a| progressed.push(a.filename.clone()),
        )
        .await
        .unwrap();

        assert_eq!(report.updated, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(progressed, ["b.png", "a.png", "c.png"]);

        let calls = calls(&server).await;
        let expected = [
            ("drive/files/find", json!({ "name": "b.png", "folderId": "photos", "i": "t" })),
            ("drive/files/update", json!({ "fileId": "fb", "comment": "second", "i": "t" })),
            ("drive/files/find", json!({ "name": "a.png", "folderId": "photos", "i": "t" })),
            ("drive/files/update", json!({ "fileId": "fa", "comment": "first", "i": "t" })),
            ("drive/files/find", json!({ "name": "c.png", "folderId": "photos", "i": "t" })),
            ("drive/files/update", json!({ "fileId": "fc", "comment": "", "i": "t" })),
        ];
        assert_eq!(calls.len(), expected.len());
        for ((endpoint, body), (want_endpoint, want_body)) in calls.iter().zip(expected) {
            assert_eq!(endpoint, want_endpoint);
            assert_eq!(body, &want_body);
        }
    }

    #[tokio::test]
    async fn missing_file_aborts_by_default() {
        let server = server_with_files(&[("a.png", "fa")]).await;
        let api = ApiClient::new(server.uri(), "t").unwrap();
        let attachments = vec![
            attachment("a.png", "first"),
            attachment("gone.png", "lost"),
            attachment("a.png", "never reached"),
        ];
        let mut progress = 0;

        let err = update_attachments(
            &api,
            &folder(),
            &attachments,
            MissingFilePolicy::Abort,
            |_| progress += 1,
        )
        .await
        .unwrap_err();

        match err.downcast_ref::<MigrateError>() {
            Some(MigrateError::FileNotFound { filename, folder }) => {
                assert_eq!(filename, "gone.png");
                assert_eq!(folder, "Drive > Photos");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(progress, 1);
        let updates = calls(&server)
            .await
            .into_iter()
            .filter(|(endpoint, _)| endpoint == "drive/files/update")
            .count();
        assert_eq!(updates, 1);
    }

    #[tokio::test]
    async fn missing_file_is_skipped_when_asked() {
        let server = server_with_files(&[("a.png", "fa"), ("c.png", "fc")]).await;
        let api = ApiClient::new(server.uri(), "t").unwrap();
        let attachments = vec![
            attachment("a.png", "first"),
            attachment("gone.png", "lost"),
            attachment("c.png", "third"),
        ];
        let mut progress = 0;

        let report = update_attachments(
            &api,
            &folder(),
            &attachments,
            MissingFilePolicy::Skip,
            |_| progress += 1,
        )
        .await
        .unwrap();

        assert_eq!(
            report,
            UpdateReport {
                updated: 2,
                skipped: vec!["gone.png".into()],
            }
        );
        assert_eq!(progress, 3);
    }

    #[tokio::test]
    async fn first_match_wins_when_names_repeat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/drive/files/find"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "first", "name": "dup.png", "comment": "old" },
                { "id": "second", "name": "dup.png", "comment": null }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/drive/files/update"))
            .and(body_partial_json(json!({ "fileId": "first" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let api = ApiClient::new(server.uri(), "t").unwrap();

        let resolution = resolve_and_update(&api, &folder(), &attachment("dup.png", "new"))
            .await
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::Updated {
                file_id: "first".into()
            }
        );
    }
}
