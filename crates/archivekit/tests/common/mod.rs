//! Fixture archives.
//!
//! Every regular file in these fixtures holds its own base name as content.
//! Most archives are built on the fly. The `zip` writer cannot produce
//! ZipCrypto entries, so that variant is a checked-in file made by Info-ZIP
//! (`zip -P 1234`) with the same entries in the same order.

#![allow(dead_code)]

use std::{
    io::{Cursor, Write},
    path::PathBuf,
};

use tempfile::TempDir;
use zip::{write::SimpleFileOptions, AesMode, CompressionMethod, ZipWriter};

pub const PASSWORD: &str = "1234";

/// The visible regular files of every fixture.
pub const TEXT_FILES: [&str; 4] = ["kr/텍스트1.txt", "kr/텍스트2.txt", "text1.txt", "text2.txt"];

/// Entries in archive order: directories end in `/`.
pub const TEXT_ENTRIES: [&str; 7] = [
    "kr/",
    "kr/텍스트1.txt",
    "kr/텍스트2.txt",
    "kr/.hidden.txt",
    "text1.txt",
    "text2.txt",
    ".DS_Store",
];

pub fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// [`TEXT_ENTRIES`] stored with ZipCrypto under [`PASSWORD`].
pub const TEXT_ZIPCRYPTO: &[u8] = include_bytes!("../fixtures/text-zipcrypto.zip");

/// A directory holding one fixture archive; removed on drop.
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

fn write_fixture(file_name: &str, bytes: &[u8]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);
    std::fs::write(&path, bytes).unwrap();
    Fixture { dir, path }
}

pub fn text_tar() -> Fixture {
    let mut builder = tar::Builder::new(vec![]);
    for name in TEXT_ENTRIES {
        let mut header = tar::Header::new_ustar();
        header.set_uid(1000);
        header.set_gid(1000);
        header.set_mtime(1_700_000_000);
        if let Some(dir) = name.strip_suffix('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            header.set_cksum();
            builder.append_data(&mut header, dir, std::io::empty()).unwrap();
        } else {
            let data = base_name(name).as_bytes();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
            header.set_cksum();
            builder.append_data(&mut header, name, data).unwrap();
        }
    }
    write_fixture("text.tar", &builder.into_inner().unwrap())
}

/// How the fixture's files are stored.
#[derive(Clone, Copy, Debug)]
pub enum Storage {
    Deflated,
    Bzip2,
    Zstd,
    ZipCrypto,
    Aes,
}

pub fn text_zip(storage: Storage) -> Fixture {
    let file_name = format!("{storage:?}.zip").to_lowercase();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = match storage {
        Storage::Deflated => {
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
        }
        Storage::Bzip2 => SimpleFileOptions::default().compression_method(CompressionMethod::Bzip2),
        Storage::Zstd => SimpleFileOptions::default().compression_method(CompressionMethod::Zstd),
        Storage::ZipCrypto => return write_fixture(&file_name, TEXT_ZIPCRYPTO),
        Storage::Aes => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .with_aes_encryption(AesMode::Aes256, PASSWORD),
    };
    for name in TEXT_ENTRIES {
        if name.ends_with('/') {
            writer.add_directory(name, SimpleFileOptions::default()).unwrap();
        } else {
            writer.start_file(name, options).unwrap();
            writer.write_all(base_name(name).as_bytes()).unwrap();
        }
    }
    let bytes = writer.finish().unwrap().into_inner();
    write_fixture(&file_name, &bytes)
}
