use std::path::Path;

/// Metadata of an uploaded exam document.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub filename: String,
    pub kind: UploadKind,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Pdf,
    Docx,
    Image,
    Text,
    Markdown,
}

impl UploadKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" | "docx" => Some(Self::Docx),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "txt" => Some(Self::Text),
            "md" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Image => "image/jpeg",
            Self::Text => "text/plain",
            Self::Markdown => "text/markdown",
        }
    }

    /// Whether the raw bytes are readable as UTF-8 text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Markdown)
    }
}

impl Upload {
    pub fn new(filename: String, kind: UploadKind, size_bytes: u64) -> Self {
        Self {
            filename,
            kind,
            size_bytes,
        }
    }
}
