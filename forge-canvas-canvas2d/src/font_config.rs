//! Font configuration for canvas contexts.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Fonts available to a canvas context.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Raw font files to register in addition to system fonts.
    pub custom_fonts: Vec<CustomFont>,
    /// Preferred concrete families for the CSS generic families.
    pub generic_families: GenericFamilyMap,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Whether glyph hinting is applied when shaping (default: false).
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

/// A font file held in memory.
#[derive(Clone, Debug)]
pub struct CustomFont {
    /// Raw font file data (TTF/OTF). Arc-wrapped for cheap cloning.
    pub data: Arc<Vec<u8>>,
}

/// Concrete family preferences for each CSS generic family, in priority order.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub sans_serif: Vec<String>,
    pub serif: Vec<String>,
    pub monospace: Vec<String>,
    pub cursive: Vec<String>,
    pub fantasy: Vec<String>,
}

impl GenericFamilyMap {
    /// Browser-like defaults.
    pub fn defaults() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            sans_serif: names(&["Arial", "Helvetica", "Liberation Sans", "DejaVu Sans"]),
            serif: names(&["Times New Roman", "Times", "Liberation Serif", "DejaVu Serif"]),
            monospace: names(&["Courier New", "Courier", "Liberation Mono", "DejaVu Sans Mono"]),
            cursive: names(&["Comic Sans MS", "Apple Chancery"]),
            fantasy: names(&["Impact", "Papyrus"]),
        }
    }
}

impl FontConfig {
    /// Build the font database described by this configuration.
    pub fn to_fontdb(&self) -> fontdb::Database {
        let mut db = fontdb::Database::new();

        if self.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &self.font_dirs {
            db.load_fonts_dir(dir);
        }
        for font in &self.custom_fonts {
            db.load_font_data(Vec::from(font.data.as_slice()));
        }

        apply_generic_families(&mut db, &self.generic_families);
        log::debug!("font database loaded with {} faces", db.len());
        db
    }
}

/// Point each generic family at the first preferred family present in the database.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _lang)| name.clone()))
        .collect();
    let pick = |candidates: &[String]| candidates.iter().find(|f| available.contains(*f)).cloned();

    if let Some(family) = pick(&families.sans_serif) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = pick(&families.serif) {
        db.set_serif_family(family);
    }
    if let Some(family) = pick(&families.monospace) {
        db.set_monospace_family(family);
    }
    if let Some(family) = pick(&families.cursive) {
        db.set_cursive_family(family);
    }
    if let Some(family) = pick(&families.fantasy) {
        db.set_fantasy_family(family);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_font_config() {
        let config = FontConfig::default();
        assert!(config.custom_fonts.is_empty());
        assert!(config.load_system_fonts);
        assert!(config.font_dirs.is_empty());
        assert_eq!(config.generic_families.sans_serif[0], "Arial");
        assert!(!config.hinting_enabled);
    }

    #[test]
    fn test_to_fontdb_without_system_fonts() {
        let config = FontConfig {
            load_system_fonts: false,
            ..FontConfig::default()
        };
        assert_eq!(config.to_fontdb().faces().count(), 0);
    }

    #[test]
    fn test_custom_font_data_is_shared() {
        let config = FontConfig {
            custom_fonts: vec![CustomFont {
                data: Arc::new(vec![0u8; 64]),
            }],
            ..FontConfig::default()
        };
        let cloned = config.clone();
        assert!(Arc::ptr_eq(
            &config.custom_fonts[0].data,
            &cloned.custom_fonts[0].data
        ));
    }
}
