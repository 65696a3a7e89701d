//! Font files available to the rasterizer, loaded once at startup.
//!
//! Faces are keyed by their normalised file stem: `JetBrainsMono-Bold.ttf` becomes
//! `jetbrainsmonobold`, `Georgia.ttf` becomes `georgia`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ab_glyph::FontVec;
use tracing::{info, warn};

use crate::templates::tree::Weight;

#[derive(Default)]
pub struct FontLibrary {
    faces: BTreeMap<String, Arc<FontVec>>,
}

impl FontLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every `.ttf`/`.otf` in `dir`. Unparseable files are skipped with a warning.
    pub fn load_dir(dir: &Path) -> std::io::Result<Self> {
        let mut library = Self::empty();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_font => stem,
                _ => continue,
            };
            let bytes = std::fs::read(&path)?;
            match FontVec::try_from_vec(bytes) {
                Ok(font) => library.insert(stem, font),
                Err(e) => warn!("Skipping font {}: {e}", path.display()),
            }
        }
        info!("Loaded {} font face(s) from {}", library.len(), dir.display());
        Ok(library)
    }

    pub fn insert(&mut self, name: &str, font: FontVec) {
        self.faces.insert(normalise(name), Arc::new(font));
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Picks the face for `family` at `weight`, falling back to the family's regular
    /// face and then to any loaded face of the same weight, preferring one named
    /// "bold" or "regular".
    pub fn resolve(&self, family: &str, weight: Weight) -> Option<Arc<FontVec>> {
        let family = normalise(family);
        let mut candidates = Vec::with_capacity(3);
        if weight == Weight::Bold {
            candidates.push(format!("{family}bold"));
        }
        candidates.push(format!("{family}regular"));
        candidates.push(family);

        let suffix = match weight {
            Weight::Bold => "bold",
            Weight::Regular => "regular",
        };
        candidates
            .iter()
            .find_map(|name| self.faces.get(name))
            .or_else(|| self.any_ending_with(suffix))
            .or_else(|| self.any_ending_with("regular"))
            .or_else(|| self.faces.values().next())
            .cloned()
    }

    fn any_ending_with(&self, suffix: &str) -> Option<&Arc<FontVec>> {
        self.faces
            .iter()
            .find(|(name, _)| name.ends_with(suffix))
            .map(|(_, face)| face)
    }

    /// Normalised names of all loaded faces, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.faces.keys().map(String::as_str)
    }
}

/// Faces shipped in the crate's `fonts/` directory.
#[cfg(test)]
pub(crate) fn bundled() -> Arc<FontLibrary> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fonts");
    Arc::new(FontLibrary::load_dir(&dir).expect("bundled fonts"))
}

fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_strips_separators_and_case() {
        assert_eq!(normalise("JetBrains Mono"), "jetbrainsmono");
        assert_eq!(normalise("JetBrainsMono-Bold"), "jetbrainsmonobold");
        assert_eq!(normalise("source_serif_4"), "sourceserif4");
    }

    #[test]
    fn test_empty_library_resolves_nothing() {
        let library = FontLibrary::empty();
        assert!(library.is_empty());
        assert!(library.resolve("Inter", Weight::Regular).is_none());
    }

    #[test]
    fn test_load_dir_skips_non_fonts_and_bad_fonts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a font").unwrap();
        std::fs::write(dir.path().join("Broken-Regular.ttf"), b"garbage").unwrap();
        let library = FontLibrary::load_dir(dir.path()).unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn test_bundled_fonts_cover_both_weights() {
        let library = bundled();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["dejavusans", "dejavusansbold"]);

        let regular = library.resolve("Georgia", Weight::Regular).unwrap();
        let bold = library.resolve("Georgia", Weight::Bold).unwrap();
        assert!(Arc::ptr_eq(&regular, &library.faces["dejavusans"]));
        assert!(Arc::ptr_eq(&bold, &library.faces["dejavusansbold"]));
    }

    #[test]
    fn test_family_match_beats_weight_fallback() {
        let library = bundled();
        let face = library.resolve("DejaVu Sans", Weight::Bold).unwrap();
        assert!(Arc::ptr_eq(&face, &library.faces["dejavusansbold"]));
        let face = library.resolve("DejaVu Sans", Weight::Regular).unwrap();
        assert!(Arc::ptr_eq(&face, &library.faces["dejavusans"]));
    }

    #[test]
    fn test_load_dir_missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FontLibrary::load_dir(&dir.path().join("nope")).is_err());
    }
}
