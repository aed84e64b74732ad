use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, WorkdocError};

pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxPackage {
    pub entries: Vec<DocxEntry>,
}

pub struct DocxEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub last_modified: zip::DateTime,
    pub unix_mode: Option<u32>,
    pub is_dir: bool,
}

/// Only the zipped WordprocessingML format is handled; legacy `.doc` is a
/// different binary container.
pub fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("docx") => Ok(()),
        Some("doc") => Err(WorkdocError::unsupported(
            path,
            "legacy binary .doc documents are not supported, convert to .docx",
        )),
        _ => Err(WorkdocError::unsupported(path, "expected a .docx file")),
    }
}

impl DocxPackage {
    pub fn read(path: &Path) -> Result<Self> {
        check_extension(path)?;
        let f = File::open(path).map_err(|e| WorkdocError::io(path, e))?;
        let mut zip = ZipArchive::new(f).map_err(|e| zip_read_error(path, e))?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).map_err(|e| zip_read_error(path, e))?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| WorkdocError::io(path, e))?;
            entries.push(DocxEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                last_modified: file.last_modified().unwrap_or_default(),
                unix_mode: file.unix_mode(),
                is_dir: file.is_dir(),
            });
        }
        let pkg = Self { entries };
        if pkg.entry(MAIN_DOCUMENT_PART).is_none() {
            return Err(WorkdocError::unsupported(
                path,
                format!("package has no {MAIN_DOCUMENT_PART}"),
            ));
        }
        tracing::debug!(path = %path.display(), entries = pkg.entries.len(), "read package");
        Ok(pkg)
    }

    pub fn entry(&self, name: &str) -> Option<&DocxEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Write every entry to `output_path`, substituting the bytes of entries
    /// named in `replacements`. Entry order and zip metadata are kept.
    ///
    /// The archive is assembled in a sibling temp file and renamed over the
    /// target, so a failed write never leaves a truncated document behind.
    pub fn write_with_replacements(
        &self,
        output_path: &Path,
        replacements: &HashMap<String, Vec<u8>>,
    ) -> Result<()> {
        let tmp_path = temp_sibling(output_path);
        let written = self.write_archive(&tmp_path, replacements);
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
        std::fs::rename(&tmp_path, output_path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            WorkdocError::package_write(output_path, e)
        })?;
        tracing::debug!(
            path = %output_path.display(),
            replaced = replacements.len(),
            "wrote package"
        );
        Ok(())
    }

    fn write_archive(&self, path: &Path, replacements: &HashMap<String, Vec<u8>>) -> Result<()> {
        let write_err = |e: &dyn std::fmt::Display| WorkdocError::package_write(path, e);
        let f = File::create(path).map_err(|e| WorkdocError::io(path, e))?;
        let mut zout = ZipWriter::new(f);
        for ent in &self.entries {
            let data = replacements.get(&ent.name).unwrap_or(&ent.data);
            let mut opts = SimpleFileOptions::default()
                .compression_method(ent.compression)
                .last_modified_time(ent.last_modified);
            if let Some(mode) = ent.unix_mode {
                opts = opts.unix_permissions(mode);
            }
            if ent.is_dir || ent.name.ends_with('/') {
                zout.add_directory(ent.name.as_str(), opts)
                    .map_err(|e| write_err(&format!("add dir {}: {e}", ent.name)))?;
            } else {
                zout.start_file(ent.name.as_str(), opts)
                    .map_err(|e| write_err(&format!("start file {}: {e}", ent.name)))?;
                zout.write_all(data)
                    .map_err(|e| write_err(&format!("write file {}: {e}", ent.name)))?;
            }
        }
        zout.finish().map_err(|e| write_err(&e))?;
        Ok(())
    }
}

fn zip_read_error(path: &Path, e: ZipError) -> WorkdocError {
    match e {
        ZipError::Io(io) => WorkdocError::io(path, io),
        other => WorkdocError::unsupported(path, format!("not a zip package: {other}")),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.docx".to_string());
    path.with_file_name(format!(".{name}.workdoc-tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut z = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in files {
            z.start_file(*name, SimpleFileOptions::default()).unwrap();
            z.write_all(data).unwrap();
        }
        z.finish().unwrap();
    }

    #[test]
    fn rejects_legacy_doc_and_other_extensions() {
        for name in ["a.doc", "a.txt", "noext"] {
            let err = DocxPackage::read(Path::new(name)).err().unwrap();
            assert!(matches!(err, WorkdocError::UnsupportedFormat { .. }), "{name}");
        }
    }

    #[test]
    fn rejects_non_zip_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.DOCX");
        std::fs::write(&path, b"plain text").unwrap();
        let err = DocxPackage::read(&path).err().unwrap();
        assert!(matches!(err, WorkdocError::UnsupportedFormat { .. }));
    }

    #[test]
    fn rejects_zip_without_main_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.docx");
        write_zip(&path, &[("readme.txt", b"hi")]);
        let err = DocxPackage::read(&path).err().unwrap();
        assert!(matches!(err, WorkdocError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocxPackage::read(&dir.path().join("gone.docx")).err().unwrap();
        assert!(matches!(err, WorkdocError::Io { .. }));
    }

    #[test]
    fn rewrite_keeps_order_and_replaces_named_entries() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.docx");
        let dst = dir.path().join("out.docx");
        write_zip(
            &src,
            &[("[Content_Types].xml", b"<Types/>"), (MAIN_DOCUMENT_PART, b"<old/>")],
        );
        let pkg = DocxPackage::read(&src).unwrap();
        let mut repl = HashMap::new();
        repl.insert(MAIN_DOCUMENT_PART.to_string(), b"<new/>".to_vec());
        pkg.write_with_replacements(&dst, &repl).unwrap();

        let back = DocxPackage::read(&dst).unwrap();
        let names: Vec<&str> = back.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["[Content_Types].xml", MAIN_DOCUMENT_PART]);
        assert_eq!(back.entry(MAIN_DOCUMENT_PART).unwrap().data, b"<new/>");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
