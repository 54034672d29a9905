use std::collections::HashSet;

use common::storage::{ObjectPath, ObjectStore};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ImageEdit, SaveError};
use crate::utils::filename::sanitize_object_name;

/// Key prefix for prompt images. Questions without an id yet get a unique
/// `new-…` folder since uploads happen before the row is inserted.
pub fn prompt_dir(question_id: Option<i32>) -> String {
    match question_id {
        Some(id) => format!("questoes/{id}/enunciado"),
        None => format!("questoes/new-{}/enunciado", Uuid::new_v4().simple()),
    }
}

/// Key prefix for one alternative's images.
pub fn alternative_dir(question_id: i32, alternative_id: Option<i32>) -> String {
    match alternative_id {
        Some(id) => format!("questoes/{question_id}/alternativas/{id}"),
        None => format!(
            "questoes/{question_id}/alternativas/new-{}",
            Uuid::new_v4().simple()
        ),
    }
}

/// Apply an image edit to the `stored` list: delete removed objects, upload
/// new files under `dir`, and return the final URL list (kept URLs first,
/// then uploads). The edit must already be checked against `stored`.
pub async fn reconcile_images(
    store: &dyn ObjectStore,
    dir: &str,
    edit: ImageEdit,
    stored: &[String],
    owner: &str,
) -> Result<Vec<String>, SaveError> {
    let ImageEdit {
        kept,
        mut removed,
        uploads,
    } = edit;

    let omitted: Vec<String> = stored
        .iter()
        .filter(|url| !kept.contains(*url) && !removed.contains(*url))
        .cloned()
        .collect();
    removed.extend(omitted);

    for url in &removed {
        remove_image(store, url, owner).await?;
    }

    let removed: HashSet<&str> = removed.iter().map(String::as_str).collect();
    let mut urls: Vec<String> = kept
        .into_iter()
        .filter(|url| !removed.contains(url.as_str()))
        .collect();

    for upload in uploads {
        let key = upload_key(dir, &upload.filename)?;
        store
            .put(&key, &upload.data)
            .await
            .map_err(|source| SaveError::Storage {
                context: format!("Failed to upload image '{}' for {owner}", upload.filename),
                source,
            })?;
        debug!(key = %key, "Uploaded image");
        urls.push(store.public_url(&key));
    }

    Ok(urls)
}

/// Delete the object behind a public URL. URLs that do not point into the
/// bucket are skipped.
pub async fn remove_image(store: &dyn ObjectStore, url: &str, owner: &str) -> Result<(), SaveError> {
    let Some(path) = store.path_from_public_url(url) else {
        warn!(url, "Skipping removal of image outside the bucket");
        return Ok(());
    };

    let deleted = store
        .delete(&path)
        .await
        .map_err(|source| SaveError::Storage {
            context: format!("Failed to remove image '{}' of {owner}", path.file_name()),
            source,
        })?;
    if !deleted {
        debug!(key = %path, "Image already absent from storage");
    }
    Ok(())
}

fn upload_key(dir: &str, filename: &str) -> Result<ObjectPath, SaveError> {
    let token = Uuid::new_v4().simple().to_string();
    let name = format!("{}-{}", &token[..8], sanitize_object_name(filename));
    ObjectPath::parse(&format!("{dir}/{name}")).map_err(|source| SaveError::Storage {
        context: format!("Cannot store image '{filename}'"),
        source,
    })
}
