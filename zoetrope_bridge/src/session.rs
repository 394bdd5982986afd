use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use zoetrope_scripting::{ErrorKind, ScriptError};

/// Per-session cache of script file contents. Files are read lazily on
/// first reference, edited in memory, and flushed to disk on save.
pub struct SessionStore {
    root: PathBuf,
    main_file: String,
    files: FxHashMap<String, String>,
    has_changes: bool,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            main_file: String::new(),
            files: FxHashMap::default(),
            has_changes: false,
        }
    }

    /// Start over on `main`: the containing directory becomes the session
    /// root, the cache empties, and the main file name is returned.
    pub fn new_session(&mut self, main: &Path) -> String {
        self.root = main
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        self.main_file = main
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files.clear();
        self.has_changes = false;
        self.main_file.clone()
    }

    pub fn main_file(&self) -> &str {
        &self.main_file
    }

    pub fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Cached text of `name`, reading it from the session root on first
    /// reference. A missing or unreadable file is a resolution error.
    pub fn code_of(&mut self, name: &str) -> Result<String, ScriptError> {
        if let Some(text) = self.files.get(name) {
            return Ok(text.clone());
        }
        let path = self.root.join(name);
        let text = fs::read_to_string(&path).map_err(|e| {
            ScriptError::new(
                ErrorKind::Resolution,
                format!("can't open file '{}': {e}", path.display()),
            )
        })?;
        self.files.insert(name.to_string(), text.clone());
        Ok(text)
    }

    pub fn set_code_of(&mut self, name: &str, text: String) {
        self.files.insert(name.to_string(), text);
        self.has_changes = true;
    }

    /// Flush every cached file back under the session root.
    pub fn save_files(&mut self) -> io::Result<()> {
        for (name, text) in &self.files {
            let path = self.root.join(name);
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&path, text)?;
        }
        self.has_changes = false;
        Ok(())
    }

    pub fn used_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }
}
