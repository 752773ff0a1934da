//! Certificate generation.
//!
//! Each weigh-in gets a one-page PDF certificate in the certificates
//! directory, named from the child's name and the weigh date.

mod pdf;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::ClassifiedRecord;

pub use pdf::{Font, Page};

/// Suffix shared by every certificate file name.
const FILE_SUFFIX: &str = "_certificado.pdf";

/// Left margin of every line, in points.
const MARGIN_X: u32 = 100;

/// Characters that cannot appear in a file name on common platforms.
fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[/\\:*?"<>|\p{Cc}]"#).expect("static pattern is valid")
    })
}

/// Deterministic certificate file name for a record.
///
/// Slashes in the date become dashes; path-unsafe characters in the name
/// become underscores.
#[must_use]
pub fn file_name(record: &ClassifiedRecord) -> String {
    let r = record.record();
    let name = unsafe_chars().replace_all(r.name(), "_");
    let date = r.weigh_date_text().replace('/', "-");
    format!("{name}_{date}{FILE_SUFFIX}")
}

/// Lay out the certificate page for a record.
#[must_use]
pub fn render(record: &ClassifiedRecord) -> Page {
    let r = record.record();
    let mut page = Page::new();
    page.text(MARGIN_X, 750, Font::Bold, 16, "Certificado de Saúde Infantil")
        .text(MARGIN_X, 700, Font::Regular, 12, format!("Nome: {}", r.name()))
        .text(MARGIN_X, 670, Font::Regular, 12, format!("Idade: {} anos", r.age()))
        .text(MARGIN_X, 640, Font::Regular, 12, format!("Altura: {:.2} m", r.height_m()))
        .text(MARGIN_X, 610, Font::Regular, 12, format!("Peso: {:.2} kg", r.weight_kg()))
        .text(
            MARGIN_X,
            580,
            Font::Regular,
            12,
            format!("IMC: {:.2} ({})", r.bmi(), record.classification()),
        )
        .text(
            MARGIN_X,
            550,
            Font::Regular,
            12,
            format!("Data da Pesagem: {}", r.weigh_date_text()),
        )
        .text(MARGIN_X, 520, Font::Regular, 12, "Descrição:")
        .text(MARGIN_X, 490, Font::Regular, 12, record.recommendation());
    page
}

/// Writes and lists certificates in one directory.
#[derive(Debug, Clone)]
pub struct Certificates {
    dir: PathBuf,
}

impl Certificates {
    /// Create a handle on the given directory. Nothing is touched on disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The certificates directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render and write the certificate for a record, replacing any previous
    /// certificate with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the document
    /// cannot be built, or the file cannot be written.
    pub fn write(&self, record: &ClassifiedRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::DirectoryCreate {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file_name(record));
        let document = render(record).to_pdf()?;
        fs::write(&path, document).map_err(|source| Error::Certificate {
            path: path.clone(),
            source,
        })?;

        info!("Wrote certificate {}", path.display());
        Ok(path)
    }

    /// File names of all certificates, sorted. A missing directory yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No certificates directory at {}", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
