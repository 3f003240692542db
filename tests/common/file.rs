use derive_new::new;
use std::path::PathBuf;

#[derive(Debug, Clone, Eq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

impl PartialEq for FileSpec {
    fn eq(&self, other: &Self) -> bool {
        self.path.file_name() == other.path.file_name()
    }
}

impl Ord for FileSpec {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.file_name().cmp(&other.path.file_name())
    }
}

impl PartialOrd for FileSpec {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}
