//! Filesystem infrastructure: implements `TemplateFiles`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use isovpc_common::Template;

use crate::application::ports::TemplateFiles;

/// Production filesystem implementation of `TemplateFiles`.
pub struct LocalFs;

impl TemplateFiles for LocalFs {
    fn read_template(&self, path: &Path) -> Result<Template> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Template::from_json(&raw)
            .with_context(|| format!("{} is not a CloudFormation template", path.display()))
    }

    /// Writes through a sibling temp file and renames, so a failed write
    /// never leaves a truncated template behind.
    fn write_template(&self, path: &Path, template: &Template) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

        let json = template.to_json_pretty().context("cannot serialize template")?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("cannot create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .with_context(|| format!("cannot write {}", path.display()))?;
        tmp.persist(path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

/// Write `template` to a fresh temporary file for handing to the engine.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created or written.
pub fn template_tempfile(template: &Template) -> Result<tempfile::NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .prefix("isovpc-")
        .suffix(".template.json")
        .tempfile()
        .context("cannot create temporary template file")?;
    let json = template.to_json_pretty().context("cannot serialize template")?;
    tmp.write_all(json.as_bytes())
        .context("cannot write temporary template file")?;
    tmp.flush().context("cannot write temporary template file")?;
    Ok(tmp)
}
