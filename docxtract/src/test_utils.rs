//! Shared fixtures and constructors for tests.

use crate::config::{Config, StagingConfig};
use crate::{AppState, build_router};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;
use zip::{ZipWriter, write::SimpleFileOptions};

/// Build an in-process test server for `config`.
pub fn create_test_app(config: Config) -> TestServer {
    let state = AppState::from_config(config);
    let router = build_router(&state);
    TestServer::new(router).expect("Failed to create test server")
}

/// Default configuration with uploads staged inside `staging`.
pub fn create_test_config(staging: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        staging: StagingConfig {
            dir: Some(staging.path().to_path_buf()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Number of entries currently in the staging directory.
pub fn staged_file_count(staging: &TempDir) -> usize {
    std::fs::read_dir(staging.path()).expect("staging dir readable").count()
}

/// Build a ZIP archive from `(name, contents)` pairs.
pub fn zip_bytes(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).expect("start zip entry");
        writer.write_all(contents.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Build a minimal Word package whose body holds `body` verbatim.
pub fn docx_bytes(body: &str) -> Vec<u8> {
    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body>",
            "</w:document>"
        ),
        body
    );

    zip_bytes(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
        ),
        ("word/document.xml", document.as_str()),
    ])
}

/// Overwrite the uncompressed size recorded for every entry of `archive`, in both its local
/// and central directory headers. The data itself is left alone.
pub fn set_declared_size(archive: &mut [u8], size: u32) {
    let size = size.to_le_bytes();
    for at in 0..archive.len().saturating_sub(4) {
        let offset = match &archive[at..at + 4] {
            b"PK\x03\x04" => 22,
            b"PK\x01\x02" => 24,
            _ => continue,
        };
        archive[at + offset..at + offset + 4].copy_from_slice(&size);
    }
}

/// Write `bytes` to `dir/name`, returning the path.
pub fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// A file part with a declared content type.
pub fn document_part(bytes: Vec<u8>, content_type: &str) -> Part {
    Part::bytes(bytes).file_name("upload.docx").mime_type(content_type)
}

/// A form carrying `bytes` in the `document` field.
pub fn document_form(bytes: Vec<u8>, content_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(crate::api::handlers::extract::DOCUMENT_FIELD, document_part(bytes, content_type))
}
