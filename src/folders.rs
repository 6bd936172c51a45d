// Drive folder discovery: walks the whole folder tree and finds the folder
// that holds the archived attachments.

use anyhow::Result;
use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::api::{ApiClient, Folder};

/// Separator between folder names in a breadcrumb path.
pub const PATH_SEPARATOR: &str = " > ";

/// Enumerate every folder reachable from the drive root, each carrying its
/// breadcrumb path.
///
/// Sibling subtrees are walked concurrently, at most `concurrency` at a time
/// per level. The result lists a level's folders followed by their subtrees
/// in sibling order.
pub async fn list_all_folders(client: &ApiClient, concurrency: usize) -> Result<Vec<Folder>> {
    let folders = walk(client, None, concurrency.max(1)).await?;
    info!(count = folders.len(), "listed drive folders");
    Ok(folders)
}

fn walk<'a>(
    client: &'a ApiClient,
    parent: Option<&'a Folder>,
    concurrency: usize,
) -> BoxFuture<'a, Result<Vec<Folder>>> {
    async move {
        let prefix = parent.map(|p| format!("{}{}", p.display_path(), PATH_SEPARATOR));
        let folders: Vec<Folder> = client
            .list_folders(parent.map(|p| p.id.as_str()))
            .await?
            .into_iter()
            .map(|mut folder| {
                folder.path = Some(match &prefix {
                    Some(prefix) => format!("{}{}", prefix, folder.name),
                    None => folder.name.clone(),
                });
                folder
            })
            .collect();
        debug!(
            parent = parent.map(Folder::display_path).unwrap_or("<root>"),
            children = folders.len(),
            "listed folder level"
        );

        // Collected before streaming so the boxed future stays `Send`.
        let pending: Vec<_> = folders
            .iter()
            .map(|folder| walk(client, Some(folder), concurrency))
            .collect();
        let subtrees: Vec<Vec<Folder>> = stream::iter(pending)
            .buffered(concurrency)
            .try_collect()
            .await?;

        let mut all = folders;
        all.extend(subtrees.into_iter().flatten());
        Ok(all)
    }
    .boxed()
}

/// First folder, in the given order, holding a file named `filename`.
/// Stops querying at the first hit.
pub async fn find_folder_containing(
    client: &ApiClient,
    folders: &[Folder],
    filename: &str,
) -> Result<Option<Folder>> {
    for folder in folders {
        let matches = client.find_files(filename, &folder.id).await?;
        if !matches.is_empty() {
            info!(folder = folder.display_path(), %filename, "found attachments folder");
            return Ok(Some(folder.clone()));
        }
    }
    Ok(None)
}
