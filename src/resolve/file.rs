//! File resolution within a resolved parent folder.

use crate::{
    common::{path::join_path, Error, Result},
    core::file_record::{FileKind, RawRecord, ScopeId},
    resolve::{
        folder::{Resolved, Resolver},
        query::{build_query, Fields},
    },
};

impl Resolver<'_> {
    /// Resolve the parent chain, then look the file up inside it.
    ///
    /// The file lookup is marked shared only when the file sits directly
    /// under the shared root.
    async fn locate_file(
        &self,
        folders: &[String],
        name: &str,
        shared: bool,
        create_missing: bool,
        fields: Fields,
    ) -> Result<(Resolved, Option<(RawRecord, usize)>)> {
        let parent = self.resolve_folder(folders, shared, create_missing).await?;
        let query = build_query(
            FileKind::File,
            name,
            &parent.id,
            shared && folders.is_empty(),
        )
        .with_fields(fields);
        let path = join_path(&[join_path(folders).as_str(), name]);
        let found = self.lookup(&query, &path).await?;
        Ok((parent, found))
    }

    /// Resolve an existing file's ID.
    pub async fn resolve_file(&self, folders: &[String], name: &str, shared: bool) -> Result<Resolved> {
        let (parent, found) = self
            .locate_file(folders, name, shared, false, Fields::Identity)
            .await?;
        match found {
            Some((record, candidates)) => {
                let mut ambiguous = parent.ambiguous;
                if candidates > 1 {
                    ambiguous.push(join_path(&[join_path(folders).as_str(), name]));
                }
                Ok(Resolved {
                    id: record.id,
                    candidates,
                    ambiguous,
                })
            }
            None => Err(Error::NotFound(format!("File {} does not exist", name))),
        }
    }

    /// Succeed only if no file named `name` exists; missing parent folders
    /// are created. Returns the parent folder's ID.
    pub async fn assert_file_absent(
        &self,
        folders: &[String],
        name: &str,
        shared: bool,
    ) -> Result<ScopeId> {
        let (parent, found) = self
            .locate_file(folders, name, shared, true, Fields::Identity)
            .await?;
        match found {
            Some(_) => Err(Error::AlreadyExists(format!("File {} already exists", name))),
            None => Ok(parent.id),
        }
    }

    /// Fetch an existing file's full metadata.
    pub async fn read_file(&self, folders: &[String], name: &str, shared: bool) -> Result<RawRecord> {
        let (_, found) = self
            .locate_file(folders, name, shared, false, Fields::Full)
            .await?;
        found
            .map(|(record, _)| record)
            .ok_or_else(|| Error::NotFound(format!("The file {} does not exist", name)))
    }
}
