//! Local file store of the provider.
//!
//! Holds the descriptors of every user's shared files, indexed by file id
//! and by author, plus the home directory mapping needed to load file
//! content on demand.

use std::collections::HashMap;
use std::path::PathBuf;

use sharegrid_api::model::{FileBuffer, FileDescriptor};

use crate::users::User;

/// Descriptors of all locally shared files with lookup indexes.
pub struct FileStore {
    files: Vec<FileDescriptor>,
    by_id: HashMap<u64, FileDescriptor>,
    by_user: HashMap<String, Vec<FileDescriptor>>,
    home_dirs: HashMap<String, PathBuf>,
}

impl FileStore {
    /// Scan every user's home directory for shared files.
    ///
    /// Descriptors start without ids; [`FileStore::set_published`] installs
    /// the registry-assigned ones.
    pub fn load(users: &HashMap<String, User>) -> std::io::Result<Self> {
        let mut files = Vec::new();
        let mut home_dirs = HashMap::new();

        for user in users.values() {
            files.extend(FileDescriptor::load_dir(&user.name, &user.home_dir)?);
            home_dirs.insert(user.name.clone(), user.home_dir.clone());
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            files,
            by_id: HashMap::new(),
            by_user: HashMap::new(),
            home_dirs,
        })
    }

    /// Stamp every descriptor with the registry-assigned provider id.
    pub fn assign_provider(&mut self, provider_id: u64) {
        for file in &mut self.files {
            file.provider_id = provider_id;
        }
    }

    /// Replace the descriptors with the published ones and rebuild indexes.
    pub fn set_published(&mut self, published: Vec<FileDescriptor>) {
        self.files = published;
        self.by_id.clear();
        self.by_user.clear();

        for file in &self.files {
            self.by_id.insert(file.file_id, file.clone());
            self.by_user
                .entry(file.author.clone())
                .or_default()
                .push(file.clone());
        }
    }

    pub fn all(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn by_id(&self, file_id: u64) -> Option<&FileDescriptor> {
        self.by_id.get(&file_id)
    }

    pub fn user_files(&self, username: &str) -> &[FileDescriptor] {
        self.by_user
            .get(username)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Load the content of a local file into a fresh buffer, resolving the
    /// author's home directory.
    pub fn load_buffer(&self, descriptor: &FileDescriptor) -> std::io::Result<FileBuffer> {
        let directory = self.home_dirs.get(&descriptor.author).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no home directory for author '{}'", descriptor.author),
            )
        })?;

        let mut buffer = FileBuffer::new(descriptor.clone());
        buffer.load(directory)?;
        Ok(buffer)
    }

    pub fn home_dir(&self, username: &str) -> Option<&PathBuf> {
        self.home_dirs.get(username)
    }
}
