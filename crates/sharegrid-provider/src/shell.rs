//! Interactive provider shell.
//!
//! Presents a per-user session over the shared files: listing local and
//! remote descriptors, fetching file content into buffers and saving
//! buffers back to disk. Network calls run on the provider's Tokio runtime.

use std::collections::HashMap;
use std::sync::Arc;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::runtime::Handle;
use tracing::info;

use sharegrid_api::model::{
    Certificate, FetchTicket, FileBuffer, FileDescriptor, ProviderDescriptor,
};
use sharegrid_client::{PeerClient, RegistryClient};
use sharegrid_common::crypto::SigningIdentity;

use crate::files::FileStore;
use crate::users::User;

const SEPARATOR_WIDTH: usize = 80;
const LOGIN_ATTEMPTS: u32 = 3;

/// Interactive shell over a provider's files and peers.
pub struct Shell {
    users: HashMap<String, User>,
    store: Arc<FileStore>,
    identity: Arc<SigningIdentity>,
    certificate: Certificate,
    registry: RegistryClient,
    peers: PeerClient,
    runtime: Handle,
    /// Provider directory, refreshed by `fetch remote`
    providers: HashMap<u64, ProviderDescriptor>,
    /// Remote file directory, refreshed by `fetch remote`
    remote_files: HashMap<u64, FileDescriptor>,
    /// Open buffers per username, surviving logout
    buffers: HashMap<String, HashMap<u64, FileBuffer>>,
    next_buffer_id: u64,
    active_user: Option<String>,
}

impl Shell {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: HashMap<String, User>,
        store: Arc<FileStore>,
        identity: Arc<SigningIdentity>,
        certificate: Certificate,
        registry: RegistryClient,
        peers: PeerClient,
        runtime: Handle,
    ) -> Self {
        Self {
            users,
            store,
            identity,
            certificate,
            registry,
            peers,
            runtime,
            providers: HashMap::new(),
            remote_files: HashMap::new(),
            buffers: HashMap::new(),
            next_buffer_id: 1,
            active_user: None,
        }
    }

    /// Run the read-eval loop until `quit` or a failed login.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new()?;

        loop {
            if self.active_user.is_none() {
                println!("{}", "-".repeat(SEPARATOR_WIDTH));
                if !self.do_login(&mut editor)? {
                    break;
                }
                println!("{}", "-".repeat(SEPARATOR_WIDTH));
            }

            let prompt = format!("{}$ ", self.active_username());
            let line = match editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(&line);

            match tokens.as_slice() {
                ["logout"] => {
                    println!("logging out");
                    self.active_user = None;
                }
                ["quit"] => break,
                ["ls", target] => self.do_ls(target),
                ["fetch", target] => self.do_fetch(target),
                ["clear"] => {
                    println!("Clearing all buffers...");
                    self.buffers.remove(&self.active_username());
                }
                ["clear", id] => self.do_clear(id),
                ["save", id, name] => self.do_save(id, name),
                _ => println!("Unknown command"),
            }
        }

        Ok(())
    }

    fn active_username(&self) -> String {
        self.active_user.clone().unwrap_or_default()
    }

    fn do_login(&mut self, editor: &mut DefaultEditor) -> anyhow::Result<bool> {
        let mut attempts = LOGIN_ATTEMPTS;

        while attempts > 0 {
            attempts -= 1;

            let username = match editor.readline("Username: ") {
                Ok(line) => line.trim().to_string(),
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(false),
                Err(e) => return Err(e.into()),
            };

            let Some(user) = self.users.get(&username) else {
                println!("The entered username does not exist");
                continue;
            };

            let password = match editor.readline("Password: ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(false),
                Err(e) => return Err(e.into()),
            };

            if user.verify_password(&password) {
                println!("Login successful");
                info!(username = %username, "User logged in");
                self.active_user = Some(username);
                return Ok(true);
            }

            println!("Wrong password");
        }

        Ok(false)
    }

    fn do_ls(&self, target: &str) {
        match target {
            "my" => {
                let files = self.store.user_files(&self.active_username());
                if files.is_empty() {
                    println!("No files");
                } else {
                    println!("{}", FileDescriptor::HEADER);
                    for file in files {
                        println!("{}", file);
                    }
                }
            }
            "local" => {
                println!("{}", FileDescriptor::HEADER);
                for file in self.store.all() {
                    println!("{}", file);
                }
            }
            "remote" => {
                if self.remote_files.is_empty() {
                    println!("No remote files");
                } else {
                    println!("{}", FileDescriptor::HEADER);
                    let mut files: Vec<&FileDescriptor> = self.remote_files.values().collect();
                    files.sort_by_key(|f| f.file_id);
                    for file in files {
                        println!("{}", file);
                    }
                }
            }
            "buffers" => match self.buffers.get(&self.active_username()) {
                None => println!("No active file buffers"),
                Some(buffers) if buffers.is_empty() => println!("No active file buffers"),
                Some(buffers) => {
                    let mut ids: Vec<&u64> = buffers.keys().collect();
                    ids.sort_unstable();
                    for buffer_id in ids {
                        println!("{:3} {}", buffer_id, buffers[buffer_id].descriptor.name);
                    }
                }
            },
            _ => println!("Unknown ls command"),
        }
    }

    fn do_fetch(&mut self, target: &str) {
        if target == "remote" {
            println!("Fetching remote files...");
            if let Err(e) = self.refresh_remote() {
                println!("Failed to fetch remote directory: {}", e);
                return;
            }
            println!("Fetched descriptors for {} files", self.remote_files.len());
            return;
        }

        let Ok(file_id) = target.parse::<u64>() else {
            println!("Illegal fetch command");
            return;
        };

        if let Some(descriptor) = self.store.by_id(file_id).cloned() {
            match self.store.load_buffer(&descriptor) {
                Ok(buffer) => {
                    let buffer = self.register_buffer(buffer);
                    println!("{}", buffer);
                }
                Err(e) => println!("Failed to load file: {}", e),
            }
        } else if let Some(descriptor) = self.remote_files.get(&file_id).cloned() {
            match self.fetch_remote_file(descriptor) {
                Ok(buffer) => {
                    let buffer = self.register_buffer(buffer);
                    println!("{}", buffer);
                }
                Err(e) => println!("Fetch failed: {}", e),
            }
        } else {
            println!("Illegal fetch command");
        }
    }

    /// Refresh the provider and remote file directories from the registry.
    fn refresh_remote(&mut self) -> anyhow::Result<()> {
        let providers = self.runtime.block_on(self.registry.providers())?;
        self.providers = providers.into_iter().map(|p| (p.provider_id, p)).collect();

        let files = self
            .runtime
            .block_on(self.registry.remote_files(self.certificate.provider_id))?;
        self.remote_files = files.into_iter().map(|f| (f.file_id, f)).collect();

        Ok(())
    }

    /// Fetch the content of a remote file, exchanging certificates with its
    /// owner first if we have not talked to them yet.
    fn fetch_remote_file(&mut self, descriptor: FileDescriptor) -> anyhow::Result<FileBuffer> {
        println!("Fetching remote file {}...", descriptor.name);

        let owner_id = descriptor.provider_id;
        let owner = self
            .providers
            .get(&owner_id)
            .ok_or_else(|| anyhow::anyhow!("unknown provider {}, run 'fetch remote' first", owner_id))?
            .clone();

        if self.peers.trust().contains(owner_id) {
            println!("File is on trusted service provider {}", owner_id);
        } else {
            println!("File is on unknown service provider {}", owner_id);
            println!("Attempting certificate exchange...");
            self.runtime.block_on(
                self.peers
                    .exchange_certificates(&owner.address, &self.certificate),
            )?;
            println!("Certificate exchange completed successfully");
        }

        let mut ticket = FetchTicket::new(
            descriptor,
            self.certificate.provider_id,
            self.active_username(),
        );
        ticket.sign(&self.identity);

        let reply = self
            .runtime
            .block_on(self.peers.fetch(&owner.address, &ticket))?;
        println!("Message verified successfully");

        let mut buffer = FileBuffer::new(reply.descriptor);
        buffer.lines = reply.lines;
        Ok(buffer)
    }

    fn register_buffer(&mut self, buffer: FileBuffer) -> &FileBuffer {
        let buffer_id = self.next_buffer_id;
        self.next_buffer_id += 1;

        let buffers = self.buffers.entry(self.active_username()).or_default();
        buffers.insert(buffer_id, buffer);
        &buffers[&buffer_id]
    }

    fn do_clear(&mut self, id: &str) {
        let Ok(buffer_id) = id.parse::<u64>() else {
            println!("Illegal buffer id");
            return;
        };

        let buffers = self.buffers.entry(self.active_username()).or_default();
        if buffers.remove(&buffer_id).is_some() {
            println!("Clearing buffer {}...", buffer_id);
        } else {
            println!("The given buffer id is not in use");
        }
    }

    fn do_save(&mut self, id: &str, name: &str) {
        let Ok(buffer_id) = id.parse::<u64>() else {
            println!("Illegal save command");
            return;
        };

        let username = self.active_username();
        let Some(buffer) = self.buffers.get(&username).and_then(|b| b.get(&buffer_id)) else {
            println!("The buffer {} is not in use", buffer_id);
            return;
        };
        let Some(home_dir) = self.store.home_dir(&username) else {
            println!("No home directory for user {}", username);
            return;
        };

        match buffer.save(home_dir, name) {
            Ok(()) => println!("Buffer {} saved successfully", buffer_id),
            Err(e) => println!("An error has occurred while writing to file: {}", e),
        }
    }
}
