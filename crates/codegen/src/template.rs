//! Header and trailer fragments of the generated program.
//!
//! The header's first line is a marker for the tool that owns the file and
//! is dropped; every other line of both fragments is copied as is.

use std::path::Path;

use crate::error::EmitError;

#[derive(Debug, Clone, Default)]
pub struct Templates {
    header: Vec<String>,
    trailer: Vec<String>,
}

impl Templates {
    /// Read both fragments fully before anything is generated.
    pub fn load(header: &Path, trailer: &Path) -> Result<Self, EmitError> {
        Ok(Templates::from_text(&read(header)?, &read(trailer)?))
    }

    pub fn from_text(header: &str, trailer: &str) -> Self {
        Templates {
            header: header.lines().skip(1).map(str::to_owned).collect(),
            trailer: trailer.lines().map(str::to_owned).collect(),
        }
    }

    pub fn write_header(&self, out: &mut String) {
        write_lines(&self.header, out);
    }

    pub fn write_trailer(&self, out: &mut String) {
        write_lines(&self.trailer, out);
    }
}

fn read(path: &Path) -> Result<String, EmitError> {
    std::fs::read_to_string(path).map_err(|e| EmitError::Template {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write_lines(lines: &[String], out: &mut String) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}
