use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use bincode::Options;
use displaydoc::Display;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// The potential errors of the artifact store.
#[derive(Debug, Display, Error)]
pub enum ArtifactError {
    /// Failed to access the artifact {key}: {source}
    Io {
        key: ArtifactKey,
        source: std::io::Error,
    },
    /// Failed to (de)serialize the artifact {key}: {source}
    Serialization {
        key: ArtifactKey,
        source: bincode::Error,
    },
    /// Missing the artifact {0}
    Missing(ArtifactKey),
}

/// The names of the prepared artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKey {
    /// The tokens of the training texts.
    Tokens,
    /// The token counts.
    W2Count,
    /// The mapping from token to index.
    W2Idx,
    /// The mapping from index to token.
    I2W,
    /// The word vectors of the vocabulary.
    W2Vec,
    /// The split dataset.
    SplitData,
}

impl ArtifactKey {
    /// All artifact keys.
    pub const ALL: [ArtifactKey; 6] = [
        ArtifactKey::Tokens,
        ArtifactKey::W2Count,
        ArtifactKey::W2Idx,
        ArtifactKey::I2W,
        ArtifactKey::W2Vec,
        ArtifactKey::SplitData,
    ];

    /// The name of the artifact.
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKey::Tokens => "tokens",
            ArtifactKey::W2Count => "w2count",
            ArtifactKey::W2Idx => "w2idx",
            ArtifactKey::I2W => "i2w",
            ArtifactKey::W2Vec => "w2vec",
            ArtifactKey::SplitData => "split_data",
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Saves and loads artifacts by name.
pub trait ArtifactStore {
    /// Saves the artifact, replacing an existing one.
    fn save<T>(&self, key: ArtifactKey, artifact: &T) -> Result<(), ArtifactError>
    where
        T: Serialize + ?Sized;

    /// Loads the artifact.
    fn load<T>(&self, key: ArtifactKey) -> Result<T, ArtifactError>
    where
        T: DeserializeOwned;
}

fn serialize_into<T>(
    key: ArtifactKey,
    writer: impl Write,
    artifact: &T,
) -> Result<(), ArtifactError>
where
    T: Serialize + ?Sized,
{
    bincode::DefaultOptions::new()
        .serialize_into(writer, artifact)
        .map_err(|source| ArtifactError::Serialization { key, source })
}

fn deserialize_from<T>(key: ArtifactKey, reader: impl Read) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
{
    bincode::DefaultOptions::new()
        .deserialize_from(reader)
        .map_err(|source| ArtifactError::Serialization { key, source })
}

/// Stores the artifacts as bincode files `<key>.bin` in a directory.
///
/// An artifact is first written to a temporary file and then renamed, so a partially written
/// artifact is never visible under its name.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store in the directory, which is created if it doesn't exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The path of the artifact.
    pub fn path(&self, key: ArtifactKey) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }
}

impl ArtifactStore for FileStore {
    fn save<T>(&self, key: ArtifactKey, artifact: &T) -> Result<(), ArtifactError>
    where
        T: Serialize + ?Sized,
    {
        let path = self.path(key);
        let temp_path = path.with_extension("bin.tmp");
        let io_error = |source: std::io::Error| ArtifactError::Io { key, source };

        let write = || -> Result<(), ArtifactError> {
            let mut writer = BufWriter::new(File::create(&temp_path).map_err(io_error)?);
            serialize_into(key, &mut writer, artifact)?;
            writer
                .into_inner()
                .map_err(|error| io_error(error.into_error()))?
                .sync_all()
                .map_err(io_error)?;
            fs::rename(&temp_path, &path).map_err(io_error)
        };
        if let Err(error) = write() {
            if temp_path.exists() {
                if let Err(remove_error) = fs::remove_file(&temp_path) {
                    warn!(
                        "Failed to remove {}: {}",
                        temp_path.display(),
                        remove_error,
                    );
                }
            }
            return Err(error);
        }
        debug!("Saved the artifact {} to {}.", key, path.display());

        Ok(())
    }

    fn load<T>(&self, key: ArtifactKey) -> Result<T, ArtifactError>
    where
        T: DeserializeOwned,
    {
        let path = self.path(key);
        if !path.exists() {
            return Err(ArtifactError::Missing(key));
        }
        let file = File::open(&path).map_err(|source| ArtifactError::Io { key, source })?;
        let artifact = deserialize_from(key, BufReader::new(file))?;
        debug!("Loaded the artifact {} from {}.", key, path.display());

        Ok(artifact)
    }
}

/// Keeps the serialized artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: RefCell<HashMap<ArtifactKey, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether the artifact is stored.
    pub fn contains(&self, key: ArtifactKey) -> bool {
        self.artifacts.borrow().contains_key(&key)
    }
}

impl ArtifactStore for MemoryStore {
    fn save<T>(&self, key: ArtifactKey, artifact: &T) -> Result<(), ArtifactError>
    where
        T: Serialize + ?Sized,
    {
        let mut bytes = Vec::new();
        serialize_into(key, &mut bytes, artifact)?;
        self.artifacts.borrow_mut().insert(key, bytes);
        debug!("Saved the artifact {} in memory.", key);

        Ok(())
    }

    fn load<T>(&self, key: ArtifactKey) -> Result<T, ArtifactError>
    where
        T: DeserializeOwned,
    {
        let artifacts = self.artifacts.borrow();
        let bytes = artifacts.get(&key).ok_or(ArtifactError::Missing(key))?;
        deserialize_from(key, bytes.as_slice())
    }
}
