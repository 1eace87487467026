//! Rule file persistence
//!
//! Extraction and generation run as separate commands, so the rule set travels between
//! them as JSON together with the colors its symbols stand for.

use crate::analysis::rules::RuleSet;
use crate::io::error::{Result, WithContext, invalid_source};
use crate::spatial::symbols::SymbolTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Serialized rule set plus its palette
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleFile {
    /// RGBA color of symbol `i + 1` at index `i`
    pub palette: Vec<[u8; 4]>,
    /// Extracted rules
    pub rules: RuleSet,
}

impl RuleFile {
    /// Bundle rules with the symbol table they were extracted with
    pub fn new(palette: &SymbolTable<[u8; 4]>, rules: RuleSet) -> Self {
        Self {
            palette: palette.identities().to_vec(),
            rules,
        }
    }

    /// Rebuild the color lookup for export
    pub fn symbol_table(&self) -> SymbolTable<[u8; 4]> {
        SymbolTable::from_identities(self.palette.clone())
    }

    /// Check that the rules are well formed and every tile symbol has a color
    ///
    /// # Errors
    ///
    /// Returns an error if the rule set is malformed or the palette is too short
    pub fn validate(&self) -> Result<()> {
        self.rules.validate()?;
        if let Some(missing) = self
            .rules
            .symbols()
            .iter()
            .find(|s| !s.is_sentinel() && s.index() > self.palette.len())
        {
            return Err(invalid_source(&format!(
                "symbol {missing} has no color in a palette of {}",
                self.palette.len()
            )));
        }
        Ok(())
    }

    /// Encode as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid rule file
    pub fn from_json(text: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    /// Write to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_path(parent)
                .with_operation("create directory")?;
        }
        let json = self.to_json().with_path(path)?;
        std::fs::write(path, json)
            .with_path(path)
            .with_operation("write rules")?;
        info!(path = %path.display(), kernels = self.rules.kernels().len(), "saved rules");
        Ok(())
    }

    /// Read and validate a rule file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid rule file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_path(path)
            .with_operation("read rules")?;
        let file = Self::from_json(&text).with_path(path)?;
        info!(path = %path.display(), kernels = file.rules.kernels().len(), "loaded rules");
        Ok(file)
    }
}
