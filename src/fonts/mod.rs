//! Font loading for the PDF backend.
//!
//! Exam papers are set in a Times-compatible serif with a Courier-compatible monospace face for
//! tabular bodies.  The Liberation families are used because they are metric-compatible with
//! both and ship with most Linux distributions.
//!
//! Directories are searched in this order:
//!
//! 1. the directory passed to [`FontSearch::with_directory`] (usually from the config file),
//! 2. `EXAM_PAPER_FONTS_DIR`,
//! 3. `assets/fonts` next to the running executable,
//! 4. `assets/fonts` in the crate directory,
//! 5. the usual system locations of the Liberation fonts.
//!
//! When no serif family is found, Windows' Times New Roman / Courier New are tried as a fallback.
//! A missing monospace family is not fatal: tabular bodies then reuse the serif family.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Environment variable naming an extra font directory.
pub const FONTS_DIR_ENV: &str = "EXAM_PAPER_FONTS_DIR";

/// Name of the serif family, as used in its file names.
pub const SERIF_FAMILY_NAME: &str = "LiberationSerif";

/// Name of the monospace family, as used in its file names.
pub const MONO_FAMILY_NAME: &str = "LiberationMono";

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/liberation-serif",
    "/usr/share/fonts/liberation-mono",
    "/usr/local/share/fonts",
];

/// File names of the four faces of one family.
struct FamilyFiles {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }
}

const SERIF_FILES: FamilyFiles = FamilyFiles {
    regular: "LiberationSerif-Regular.ttf",
    bold: "LiberationSerif-Bold.ttf",
    italic: "LiberationSerif-Italic.ttf",
    bold_italic: "LiberationSerif-BoldItalic.ttf",
};

const MONO_FILES: FamilyFiles = FamilyFiles {
    regular: "LiberationMono-Regular.ttf",
    bold: "LiberationMono-Bold.ttf",
    italic: "LiberationMono-Italic.ttf",
    bold_italic: "LiberationMono-BoldItalic.ttf",
};

const WINDOWS_SERIF_FILES: FamilyFiles = FamilyFiles {
    regular: "times.ttf",
    bold: "timesbd.ttf",
    italic: "timesi.ttf",
    bold_italic: "timesbi.ttf",
};

const WINDOWS_MONO_FILES: FamilyFiles = FamilyFiles {
    regular: "cour.ttf",
    bold: "courbd.ttf",
    italic: "couri.ttf",
    bold_italic: "courbi.ttf",
};

/// The font families used by a paper.
pub struct PaperFonts {
    pub serif: FontFamily<FontData>,
    /// `None` when no monospace family could be loaded.
    pub mono: Option<FontFamily<FontData>>,
}

/// Where to look for font files.
#[derive(Clone, Debug, Default)]
pub struct FontSearch {
    directory: Option<PathBuf>,
}

impl FontSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory that is searched before all others.
    pub fn with_directory(mut self, directory: impl Into<Option<PathBuf>>) -> Self {
        self.directory = directory.into();
        self
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        let mut push = |candidate: PathBuf| {
            if !candidates.iter().any(|existing| existing == &candidate) {
                candidates.push(candidate);
            }
        };

        if let Some(directory) = &self.directory {
            push(directory.clone());
        }

        if let Some(path) = env_path(FONTS_DIR_ENV) {
            push(path);
        }

        if let Ok(current_exe) = env::current_exe() {
            if let Some(bin_dir) = current_exe.parent() {
                push(bin_dir.join("assets/fonts"));
            }
        }

        push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));

        for system in SYSTEM_FONT_DIRECTORIES {
            push(PathBuf::from(system));
        }

        candidates
    }

    fn resolve(&self, files: &FamilyFiles, family: &str) -> Result<PathBuf, Error> {
        let mut attempts = Vec::new();

        for candidate in self.candidates() {
            if !candidate.is_dir() {
                attempts.push(format!("{} (directory missing)", candidate.display()));
                continue;
            }
            let missing = missing_font_files(&candidate, files);
            if missing.is_empty() {
                debug!("using {} fonts from {}", family, candidate.display());
                return Ok(candidate);
            }
            attempts.push(format!(
                "{} (missing files [{}])",
                candidate.display(),
                missing.join(", ")
            ));
        }

        Err(Error::new(
            format!(
                "Unable to locate the {} font family. Checked: {}. Set {} to a directory holding the font files.",
                family,
                attempts.join(", "),
                FONTS_DIR_ENV
            ),
            io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
        ))
    }

    /// Loads the serif family and, when available, the monospace family.
    pub fn load(&self) -> Result<PaperFonts, Error> {
        let serif = match self.load_family(&SERIF_FILES, SERIF_FAMILY_NAME) {
            Ok(family) => family,
            Err(err) if fonts_missing(&err) => match windows_family(&WINDOWS_SERIF_FILES) {
                Ok(fallback) => {
                    warn!("{}; falling back to Windows 'Times New Roman'", err);
                    fallback
                }
                Err(fallback_err) => {
                    warn!("{}; Windows fallback failed: {}", err, fallback_err);
                    return Err(Error::new(
                        format!("Serif fonts unavailable and Windows fallback failed: {}", err),
                        io::Error::new(io::ErrorKind::NotFound, "serif fonts are not available"),
                    ));
                }
            },
            Err(err) => return Err(err),
        };

        let mono = match self.load_family(&MONO_FILES, MONO_FAMILY_NAME) {
            Ok(family) => Some(family),
            Err(err) if fonts_missing(&err) => match windows_family(&WINDOWS_MONO_FILES) {
                Ok(fallback) => Some(fallback),
                Err(_) => {
                    warn!("{}; tabular text will use the serif family", err);
                    None
                }
            },
            Err(err) => return Err(err),
        };

        Ok(PaperFonts { serif, mono })
    }

    fn load_family(&self, files: &FamilyFiles, family: &str) -> Result<FontFamily<FontData>, Error> {
        let directory = self.resolve(files, family)?;
        load_family_from(&directory, files, family)
    }

    /// Indicates whether the serif family can be found without falling back to system fonts of
    /// another platform.
    pub fn serif_available(&self) -> bool {
        self.resolve(&SERIF_FILES, SERIF_FAMILY_NAME).is_ok()
    }
}

fn missing_font_files(path: &Path, files: &FamilyFiles) -> Vec<String> {
    files
        .all()
        .iter()
        .filter(|name| !path.join(name).is_file())
        .map(|name| name.to_string())
        .collect()
}

fn load_face(directory: &Path, file: &str, family: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load {} font face {}: {}",
                family,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_family_from(
    directory: &Path,
    files: &FamilyFiles,
    family: &str,
) -> Result<FontFamily<FontData>, Error> {
    Ok(FontFamily {
        regular: load_face(directory, files.regular, family)?,
        bold: load_face(directory, files.bold, family)?,
        italic: load_face(directory, files.italic, family)?,
        bold_italic: load_face(directory, files.bold_italic, family)?,
    })
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn windows_font_directory() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn windows_family(files: &FamilyFiles) -> Result<FontFamily<FontData>, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;
    load_family_from(&directory, files, "Windows fallback")
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_is_searched_first() {
        let search = FontSearch::new().with_directory(PathBuf::from("/opt/exam-fonts"));
        assert_eq!(
            search.candidates().first(),
            Some(&PathBuf::from("/opt/exam-fonts"))
        );
    }

    #[test]
    fn candidates_are_deduplicated() {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
        let search = FontSearch::new().with_directory(manifest.clone());
        let candidates = search.candidates();
        assert_eq!(candidates.iter().filter(|c| **c == manifest).count(), 1);
    }

    #[test]
    fn missing_directory_reports_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_family_from(dir.path(), &SERIF_FILES, SERIF_FAMILY_NAME).unwrap_err();
        assert!(fonts_missing(&err));
        assert_eq!(missing_font_files(dir.path(), &SERIF_FILES).len(), 4);
    }
}
