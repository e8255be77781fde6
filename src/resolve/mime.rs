//! Converter mapping between native rich-document types and interchange formats.
//!
//! One table serves both directions: export (native type to the default
//! download format) and import (uploaded office format to native type).

pub const DOCUMENT: &str = "application/vnd.google-apps.document";
pub const SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";
pub const PRESENTATION: &str = "application/vnd.google-apps.presentation";
pub const DRAWING: &str = "application/vnd.google-apps.drawing";
pub const SCRIPT: &str = "application/vnd.google-apps.script+json";

pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    /// Backend-native document type.
    pub native: String,
    /// Interchange format exported by default.
    pub interchange: String,
    /// Uploads of `interchange` are converted into `native`.
    pub importable: bool,
}

impl Converter {
    fn new(native: &str, interchange: &str, importable: bool) -> Self {
        Self {
            native: native.to_string(),
            interchange: interchange.to_string(),
            importable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterTable {
    converters: Vec<Converter>,
}

impl ConverterTable {
    pub fn new(converters: Vec<Converter>) -> Self {
        Self { converters }
    }

    /// Workspace documents; maps, forms and sites have no conversion.
    pub fn workspace() -> Self {
        Self::new(vec![
            Converter::new(DOCUMENT, DOCX, true),
            Converter::new(SPREADSHEET, XLSX, true),
            Converter::new(PRESENTATION, PPTX, true),
            Converter::new(DRAWING, "image/png", false),
            Converter::new(SCRIPT, "application/json", false),
        ])
    }

    /// Default export target for a native type.
    pub fn export_type(&self, native: &str) -> Option<&str> {
        self.converters
            .iter()
            .find(|c| c.native == native)
            .map(|c| c.interchange.as_str())
    }

    /// Native type an uploaded file of this type is converted into.
    pub fn import_type(&self, interchange: &str) -> Option<&str> {
        self.converters
            .iter()
            .find(|c| c.importable && c.interchange == interchange)
            .map(|c| c.native.as_str())
    }

    pub fn is_convertible(&self, native: &str) -> bool {
        self.export_type(native).is_some()
    }
}

impl Default for ConverterTable {
    fn default() -> Self {
        Self::workspace()
    }
}
