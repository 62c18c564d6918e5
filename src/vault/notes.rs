//! Higher-level note operations composed from the raw endpoints.

use tracing::debug;

use super::client::VaultClient;
use super::error::VaultError;
use super::types::{HeadingPosition, PatchOperation, PatchOptions, TargetType};

/// What [`VaultClient::create_or_update_note`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteWrite {
    Created,
    Appended,
    Overwritten,
}

impl NoteWrite {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteWrite::Created => "created",
            NoteWrite::Appended => "appended to",
            NoteWrite::Overwritten => "overwrote",
        }
    }
}

impl VaultClient {
    /// Add content at the start or end of a heading's section.
    pub async fn add_to_heading(
        &self,
        filepath: &str,
        heading: &str,
        content: &str,
        position: HeadingPosition,
        options: PatchOptions,
    ) -> Result<(), VaultError> {
        self.patch_content(
            filepath,
            position.operation().as_str(),
            TargetType::Heading.as_str(),
            heading,
            content,
            options,
        )
        .await
    }

    /// Set a frontmatter field to `value`.
    pub async fn set_frontmatter_field(
        &self,
        filepath: &str,
        field: &str,
        value: &str,
        create_if_missing: bool,
    ) -> Result<(), VaultError> {
        let options = PatchOptions {
            create_if_missing,
            ..Default::default()
        };
        self.patch_content(
            filepath,
            PatchOperation::Replace.as_str(),
            TargetType::Frontmatter.as_str(),
            field,
            value,
            options,
        )
        .await
    }

    /// Add a tag to the note's frontmatter `tags` field.
    ///
    /// Appends to an existing `tags:` line. Otherwise, or when the note cannot
    /// be read or the append fails, replaces the field with a one-element list.
    pub async fn add_tag(&self, filepath: &str, tag: &str) -> Result<(), VaultError> {
        let tag = tag.trim_start_matches('#');
        let options = PatchOptions {
            create_if_missing: true,
            ..Default::default()
        };

        let has_tags = match self.get_file_contents(filepath).await {
            Ok(content) => frontmatter_has_tags(&content),
            Err(err) => {
                debug!(%filepath, "could not read note before tagging: {}", err);
                false
            }
        };

        if has_tags {
            let appended = self
                .patch_content(
                    filepath,
                    PatchOperation::Append.as_str(),
                    TargetType::Frontmatter.as_str(),
                    "tags",
                    &format!(", {}", tag),
                    options,
                )
                .await;
            match appended {
                Ok(()) => return Ok(()),
                Err(err) => debug!(%filepath, "appending tag failed, replacing tags: {}", err),
            }
        }

        self.patch_content(
            filepath,
            PatchOperation::Replace.as_str(),
            TargetType::Frontmatter.as_str(),
            "tags",
            &format!("[{}]", tag),
            options,
        )
        .await
    }

    /// Create a note, or update an existing one.
    ///
    /// An existing note is overwritten when `overwrite` is set and appended to
    /// otherwise. A note that cannot be read is created.
    pub async fn create_or_update_note(
        &self,
        filepath: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<NoteWrite, VaultError> {
        match self.get_file_contents(filepath).await {
            Ok(_) if overwrite => {
                self.put_content(filepath, content).await?;
                Ok(NoteWrite::Overwritten)
            }
            Ok(_) => {
                self.append_content(filepath, content).await?;
                Ok(NoteWrite::Appended)
            }
            Err(err) => {
                debug!(%filepath, "note not readable, creating it: {}", err);
                self.put_content(filepath, content).await?;
                Ok(NoteWrite::Created)
            }
        }
    }

    /// Patch, retrying once with `fallback` when the first attempt fails.
    ///
    /// Without a fallback the first error is returned. With one, the error of
    /// the fallback attempt is returned.
    #[allow(clippy::too_many_arguments)]
    pub async fn patch_with_fallback(
        &self,
        filepath: &str,
        operation: &str,
        target_type: &str,
        target: &str,
        content: &str,
        options: PatchOptions,
        fallback: Option<PatchOperation>,
    ) -> Result<(), VaultError> {
        let first = self
            .patch_content(filepath, operation, target_type, target, content, options)
            .await;

        match (first, fallback) {
            (Ok(()), _) => Ok(()),
            (Err(err), None) => Err(err),
            (Err(err), Some(fallback)) => {
                debug!(%filepath, %fallback, "patch failed, retrying: {}", err);
                self.patch_content(
                    filepath,
                    fallback.as_str(),
                    target_type,
                    target,
                    content,
                    options,
                )
                .await
            }
        }
    }
}

/// Whether the `---` fenced frontmatter block has a `tags:` line.
pub(crate) fn frontmatter_has_tags(content: &str) -> bool {
    let mut in_frontmatter = false;

    for line in content.lines() {
        let line = line.trim();
        if line == "---" {
            in_frontmatter = !in_frontmatter;
            continue;
        }
        if in_frontmatter && line.starts_with("tags:") {
            return true;
        }
    }

    false
}
