use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object database
///
/// Stores blobs and commits under `.kit/objects/<XX>/<YYYY...>`, zlib
/// compressed. Objects are write-once: storing content that already exists
/// is a no-op, so identical content deduplicates to a single file.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(object_id, object_path)
    }

    pub fn store(&self, object: impl Object) -> anyhow::Result<()> {
        let object_path = self.path.join(object.object_path()?);
        let object_content = object.serialize()?;

        // write the object to disk unless it already exists
        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object_content)?;
        }

        Ok(())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(Some(Blob::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    /// Read a blob's content, failing when the id is missing or not a blob
    pub fn blob_content(&self, object_id: &ObjectId) -> anyhow::Result<String> {
        let blob = self
            .parse_object_as_blob(object_id)?
            .with_context(|| format!("object {} is not a blob", object_id))?;

        Ok(blob.content().to_string())
    }

    /// Read a commit, failing when the id is missing or not a commit
    pub fn commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        self.parse_object_as_commit(object_id)?
            .with_context(|| format!("object {} is not a commit", object_id))
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_id: &ObjectId, object_path: PathBuf) -> anyhow::Result<Bytes> {
        if !object_path.exists() {
            return Err(KitError::NotFound(object_id.to_string()).into());
        }

        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        let object_content = Self::decompress(object_content.into())?;

        Ok(object_content)
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// List the ids of every stored commit, in ascending lexicographic order
    ///
    /// Scans the fan-out directories and filters by object type. Used by
    /// prefix resolution, `global-log`, and `find`.
    pub fn list_commit_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut commit_ids = Vec::new();

        if !self.path.exists() {
            return Ok(commit_ids);
        }

        for dir_entry in std::fs::read_dir(&self.path)? {
            let dir_entry = dir_entry?;
            if !dir_entry.path().is_dir() {
                continue;
            }

            let dir_name = dir_entry.file_name().to_string_lossy().to_string();
            for file_entry in std::fs::read_dir(dir_entry.path())? {
                let file_entry = file_entry?;
                let file_name = file_entry.file_name().to_string_lossy().to_string();

                let Ok(oid) = ObjectId::try_parse(format!("{}{}", dir_name, file_name)) else {
                    // temp files and foreign entries are not objects
                    continue;
                };

                let (object_type, _) = self.parse_object_as_bytes(&oid)?;
                if object_type == ObjectType::Commit {
                    commit_ids.push(oid);
                }
            }
        }

        commit_ids.sort();
        Ok(commit_ids)
    }

    /// Resolve a full commit id or an abbreviation to a stored commit
    ///
    /// A full-length id that names a stored commit resolves to itself. Any
    /// other input is matched as a substring against every stored commit id;
    /// the lexicographically smallest match wins, which keeps abbreviated
    /// ids deterministic. Fails with `NoSuchCommit` when nothing matches.
    pub fn resolve_commit(&self, id_or_prefix: &str) -> anyhow::Result<ObjectId> {
        if let Ok(oid) = ObjectId::try_parse(id_or_prefix.to_string())
            && self.contains(&oid)
        {
            let (object_type, _) = self.parse_object_as_bytes(&oid)?;
            if object_type == ObjectType::Commit {
                return Ok(oid);
            }
        }

        self.list_commit_ids()?
            .into_iter()
            .find(|oid| oid.as_ref().contains(id_or_prefix))
            .ok_or_else(|| KitError::NoSuchCommit.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Manifest;

    fn test_database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    #[test]
    fn stored_blob_content_round_trips() {
        let (_dir, database) = test_database();

        let blob = Blob::new("some file content\n".to_string());
        let oid = blob.object_id().unwrap();
        database.store(blob).unwrap();

        assert_eq!(database.blob_content(&oid).unwrap(), "some file content\n");
    }

    #[test]
    fn storing_identical_content_twice_is_idempotent() {
        let (_dir, database) = test_database();

        let first = Blob::new("dedup me".to_string());
        let second = Blob::new("dedup me".to_string());
        let oid = first.object_id().unwrap();

        database.store(first).unwrap();
        database.store(second).unwrap();

        assert!(database.contains(&oid));
        assert_eq!(database.blob_content(&oid).unwrap(), "dedup me");
    }

    #[test]
    fn loading_a_missing_object_fails_with_not_found() {
        let (_dir, database) = test_database();

        let oid = Blob::new("never stored".to_string()).object_id().unwrap();
        let error = database.load(&oid).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<KitError>(),
            Some(KitError::NotFound(_))
        ));
    }

    #[test]
    fn commit_listing_skips_blobs() {
        let (_dir, database) = test_database();

        let blob = Blob::new("just a blob".to_string());
        database.store(blob).unwrap();

        let commit = Commit::root();
        let commit_oid = commit.object_id().unwrap();
        database.store(commit).unwrap();

        assert_eq!(database.list_commit_ids().unwrap(), vec![commit_oid]);
    }

    #[test]
    fn resolving_an_abbreviation_matches_substrings_deterministically() {
        let (_dir, database) = test_database();

        let commit = Commit::new(
            Vec::new(),
            Manifest::new(),
            "only commit".to_string(),
            Commit::timestamp_from_env(),
        );
        let oid = commit.object_id().unwrap();
        database.store(commit).unwrap();

        // a substring from the middle of the id still resolves
        let infix = &oid.as_ref()[10..18];
        assert_eq!(database.resolve_commit(infix).unwrap(), oid);
        assert_eq!(database.resolve_commit(oid.as_ref()).unwrap(), oid);

        let error = database.resolve_commit("not-a-commit").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<KitError>(),
            Some(KitError::NoSuchCommit)
        ));
    }
}
