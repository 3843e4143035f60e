//! Donation flow state: picking an amount, then attaching a payment screenshot.
//!
//! Both steps validate locally; nothing reaches the network until they pass.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Amount picker: either one of the presets or a typed custom amount, never both.
#[derive(Debug, Clone, Default)]
pub struct DonationForm {
    presets: Vec<String>,
    selected: Option<usize>,
    custom: String,
}

impl DonationForm {
    pub fn new(presets: Vec<String>) -> Self {
        Self {
            presets,
            selected: None,
            custom: String::new(),
        }
    }

    pub fn presets(&self) -> &[String] {
        &self.presets
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn custom(&self) -> &str {
        &self.custom
    }

    /// Choosing a preset discards any typed amount.
    pub fn select_preset(&mut self, index: usize) {
        if index < self.presets.len() {
            self.selected = Some(index);
            self.custom.clear();
        }
    }

    /// Typing an amount discards the preset choice. Only digits are accepted.
    pub fn push_custom_char(&mut self, c: char) {
        if c.is_ascii_digit() {
            self.selected = None;
            self.custom.push(c);
        }
    }

    pub fn pop_custom_char(&mut self) {
        self.custom.pop();
    }

    /// Amount to donate, or a validation error when nothing was chosen.
    pub fn amount(&self) -> Result<String> {
        if let Some(preset) = self.selected.and_then(|i| self.presets.get(i)) {
            return Ok(preset.clone());
        }
        let custom = self.custom.trim();
        if custom.is_empty() {
            return Err(Error::Validation {
                title: "Error",
                message: "Please select or enter an amount to donate.",
            });
        }
        Ok(custom.to_string())
    }
}

/// Screenshot upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub amount: String,
    pub email: String,
    /// Path typed by the user; the terminal stand-in for an image picker.
    pub screenshot: String,
}

impl UploadForm {
    pub fn new(amount: String) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    /// Screenshot to upload, or a validation error when none was chosen.
    pub fn screenshot_path(&self) -> Result<PathBuf> {
        let raw = self.screenshot.trim();
        if raw.is_empty() {
            return Err(Error::Validation {
                title: "No image selected",
                message: "Please select an image to upload",
            });
        }
        let path = expand_home(raw);
        if !path.is_file() {
            return Err(Error::Validation {
                title: "No image selected",
                message: "The selected image could not be found",
            });
        }
        Ok(path)
    }
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
