// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dataset file helpers: grid square mesh codes and GML file names

use crate::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

static CODELIST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"codeSpace="([^"]+)""#).expect("valid codelist regex"));
static IMAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<app:imageURI>\s*([^<\s]+)\s*</app:imageURI>").expect("valid image regex")
});

/// Latitude/longitude bounds in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Extent {
    /// Whether the point lies inside (min inclusive, max exclusive)
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat < self.max_lat && lon >= self.min_lon && lon < self.max_lon
    }
}

/// Japanese standard grid square code (second or third level)
///
/// Second level codes have 6 digits, third level codes 8 digits.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeshCode {
    digits: String,
}

impl MeshCode {
    /// Parse and validate a mesh code
    pub fn parse(code: &str) -> Result<Self, ParseError> {
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::format(format!("mesh code {code:?} is not numeric")));
        }
        if code.len() != 6 && code.len() != 8 {
            return Err(ParseError::format(format!(
                "mesh code {code:?} must have 6 or 8 digits"
            )));
        }
        let digit = |i: usize| code.as_bytes()[i] - b'0';
        // Second level subdivides the first level square 8 x 8
        if digit(4) > 7 || digit(5) > 7 {
            return Err(ParseError::format(format!(
                "mesh code {code:?} has an invalid second level square"
            )));
        }
        Ok(Self {
            digits: code.to_string(),
        })
    }

    /// Grid level (2 or 3)
    pub fn level(&self) -> u8 {
        if self.digits.len() == 8 {
            3
        } else {
            2
        }
    }

    /// The code as a digit string
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Geographic bounds of the grid square
    pub fn extent(&self) -> Extent {
        let d = |i: usize| f64::from(self.digits.as_bytes()[i] - b'0');

        // First level: 40' of latitude by 1 degree of longitude
        let mut lat = (d(0) * 10.0 + d(1)) / 1.5;
        let mut lon = d(2) * 10.0 + d(3) + 100.0;

        let mut lat_size = 1.0 / 12.0;
        let mut lon_size = 1.0 / 8.0;
        lat += d(4) * lat_size;
        lon += d(5) * lon_size;

        if self.level() == 3 {
            lat_size /= 10.0;
            lon_size /= 10.0;
            lat += d(6) * lat_size;
            lon += d(7) * lon_size;
        }

        Extent {
            min_lat: lat,
            min_lon: lon,
            max_lat: lat + lat_size,
            max_lon: lon + lon_size,
        }
    }
}

impl fmt::Display for MeshCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl FromStr for MeshCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MeshCode {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MeshCode> for String {
    fn from(code: MeshCode) -> Self {
        code.digits
    }
}

/// A PLATEAU GML file, named `<meshcode>_<featuretype>_<crs>_<option>.gml`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GmlFile {
    path: PathBuf,
    code: String,
    feature_type: String,
    is_valid: bool,
}

impl GmlFile {
    /// Create from a path and derive the name-based fields
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut file = Self {
            path: PathBuf::new(),
            code: String::new(),
            feature_type: String::new(),
            is_valid: false,
        };
        file.set_path(path);
        file
    }

    /// Path to the GML file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the path and re-derive mesh code and feature type
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        let tokens = self.name_tokens();
        self.code = tokens.first().cloned().unwrap_or_default();
        self.feature_type = tokens.get(1).cloned().unwrap_or_default();
        self.is_valid = tokens.len() >= 2 && MeshCode::parse(&self.code).is_ok();
    }

    /// Grid square of the file, if its name carries a valid mesh code
    pub fn mesh_code(&self) -> Option<MeshCode> {
        MeshCode::parse(&self.code).ok()
    }

    /// Feature type token such as "bldg", "tran" or "dem"
    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    /// Whether the file name follows the PLATEAU naming convention
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Sibling directory holding the file's textures
    ///
    /// Named from the first three name tokens plus `_appearance`, e.g.
    /// `53394525_bldg_6697_appearance`.
    pub fn appearance_directory_path(&self) -> PathBuf {
        let tokens = self.name_tokens();
        let prefix = tokens
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("_");
        let dir = format!("{prefix}_appearance");
        match self.path.parent() {
            Some(parent) => parent.join(dir),
            None => PathBuf::from(dir),
        }
    }

    /// Codelist paths referenced through `codeSpace` attributes
    ///
    /// Paths are returned as written in the file, relative to its directory.
    pub fn search_all_codelist_paths(&self) -> io::Result<BTreeSet<String>> {
        self.search(&CODELIST_PATTERN)
    }

    /// Texture paths referenced through `app:imageURI` elements
    pub fn search_all_image_paths(&self) -> io::Result<BTreeSet<String>> {
        self.search(&IMAGE_PATTERN)
    }

    fn search(&self, pattern: &Regex) -> io::Result<BTreeSet<String>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(pattern
            .captures_iter(&text)
            .map(|captures| captures[1].to_string())
            .collect())
    }

    /// Copy the file with its codelists and textures under `destination_root`
    ///
    /// The product folder layout (`<product>/udx/<feature>/...`) is kept below
    /// `destination_root`; a file outside a `udx` folder is copied directly
    /// into it. Files already present at the destination are left untouched.
    /// Referenced files missing from the source are logged and skipped.
    ///
    /// Returns the copied GML file.
    pub fn fetch(&self, destination_root: impl AsRef<Path>) -> io::Result<GmlFile> {
        let destination_root = destination_root.as_ref();
        let source = normalize(&self.path);
        let file_name = source
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

        let destination = match product_root(&source) {
            Some(root) => {
                let relative = source.strip_prefix(root).map_err(io::Error::other)?;
                let product = root.file_name().map(PathBuf::from).unwrap_or_default();
                destination_root.join(product).join(relative)
            }
            None => destination_root.join(file_name),
        };
        copy_if_absent(&source, &destination)?;

        let source_dir = source.parent().unwrap_or_else(|| Path::new(""));
        let destination_dir = destination.parent().unwrap_or(destination_root);
        let mut referenced = self.search_all_codelist_paths()?;
        referenced.extend(self.search_all_image_paths()?);
        for reference in referenced {
            let from = normalize(&source_dir.join(&reference));
            if !from.is_file() {
                tracing::warn!(path = %from.display(), "referenced file not found, skipping");
                continue;
            }
            copy_if_absent(&from, &normalize(&destination_dir.join(&reference)))?;
        }

        tracing::debug!(
            from = %self.path.display(),
            to = %destination.display(),
            "fetched GML file"
        );
        Ok(GmlFile::new(destination))
    }

    fn name_tokens(&self) -> Vec<String> {
        self.path
            .file_stem()
            .map(|stem| {
                stem.to_string_lossy()
                    .split('_')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Product folder: the parent of the nearest `udx` ancestor
fn product_root(path: &Path) -> Option<&Path> {
    path.ancestors()
        .find(|dir| dir.file_name().is_some_and(|name| name == "udx"))
        .and_then(Path::parent)
}

/// Resolve `.` and `..` lexically
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn copy_if_absent(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}
