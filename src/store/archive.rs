// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Zip archive sink, used when no writable directory is available.

use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::dir::{validate_relative_path, MemoryDirectory};
use super::serialize::FileRecord;
use super::StoreError;

/// Packs records into an in-memory zip archive, in record order.
pub fn pack_archive(records: &[FileRecord]) -> Result<Vec<u8>, StoreError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for record in records {
        validate_relative_path(&record.path)?;
        zip.start_file(record.path.as_str(), options)?;
        zip.write_all(record.contents.as_bytes())
            .map_err(|source| StoreError::io(record.path.as_str(), source))?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Unpacks an archive into a directory that can be loaded like any other.
///
/// Directory entries and entries whose names would escape the root are skipped.
pub fn unpack_archive(bytes: &[u8]) -> Result<MemoryDirectory, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let dir = MemoryDirectory::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().replace('\\', "/");
        if validate_relative_path(&name).is_err() {
            tracing::warn!(entry = %name, "skipping archive entry outside the root");
            continue;
        }
        let mut contents = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut contents)
            .map_err(|source| StoreError::io(name.as_str(), source))?;
        dir.insert(&name, contents);
    }

    Ok(dir)
}
