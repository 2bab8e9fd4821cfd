//! Command-line front end for archivekit.
//!
//! `arkctl` lists, prints and extracts the entries of TAR and ZIP archives
//! and answers the two encryption questions a caller usually asks before
//! extracting: is this archive encrypted, and does this password open it.

use std::{
    io::Write,
    path::{Component, Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use archivekit::{ArchiveReader, ContentType, Entry};

/// arkctl
#[derive(Debug, Parser)]
#[clap(name = "arkctl", version)]
pub struct App {
    /// Password for encrypted ZIP entries
    #[clap(long, global = true, env = "ARKCTL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the entries of an archive
    List {
        archive: PathBuf,
        /// Include hidden entries
        #[clap(long)]
        all: bool,
        /// Show type, size and offset for each entry
        #[clap(long, short)]
        long: bool,
    },
    /// Write the content of one entry to stdout
    Cat {
        archive: PathBuf,
        /// the entry path exactly as listed
        name: String,
        /// Stop after this many bytes
        #[clap(long)]
        bytes: Option<u64>,
    },
    /// Extract entries into a directory
    Extract {
        archive: PathBuf,
        /// destination directory, created if missing
        dest: PathBuf,
        /// Include hidden entries
        #[clap(long)]
        all: bool,
    },
    /// Exit successfully if the archive is encrypted
    CheckEncrypted { archive: PathBuf },
    /// Exit successfully if the password opens the archive
    ValidatePassword {
        archive: PathBuf,
        candidate: String,
    },
}

fn open(path: &Path, password: Option<&str>) -> Result<ArchiveReader> {
    let reader = match password {
        Some(password) => ArchiveReader::open_with_password(path, password),
        None => ArchiveReader::open(path),
    };
    reader.with_context(|| format!("opening {}", path.display()))
}

fn contents(reader: &ArchiveReader, all: bool) -> Result<Vec<Entry>> {
    let entries = reader
        .contents()
        .with_context(|| format!("listing {}", reader.path().display()))?;
    Ok(entries
        .into_iter()
        .filter(|entry| all || !entry.is_hidden())
        .collect())
}

fn type_char(content_type: ContentType) -> char {
    match content_type {
        ContentType::Directory => 'd',
        ContentType::File => '-',
        ContentType::SymbolicLink => 'l',
        ContentType::Unknown => '?',
    }
}

/// Resolve `name` below `dest`, refusing absolute paths and `..` components.
fn destination(dest: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| dest.join(relative))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = App::parse();
    let password = args.password.as_deref();

    match args.cmd {
        Command::List { archive, all, long } => {
            let reader = open(&archive, password)?;
            for entry in contents(&reader, all)? {
                if long {
                    println!(
                        "{} {:>12} {:>12} {}",
                        type_char(entry.content_type()),
                        entry.size(),
                        entry.offset(),
                        entry.name()
                    );
                } else {
                    println!("{}", entry.name());
                }
            }
        }
        Command::Cat {
            archive,
            name,
            bytes,
        } => {
            let reader = open(&archive, password)?;
            let Some(entry) = reader.entry(&name)? else {
                bail!("{name}: no such entry in {}", archive.display());
            };
            let data = match bytes {
                Some(count) => entry.data_up_to(count),
                None => entry.data(),
            }
            .with_context(|| format!("reading {name}"))?;
            std::io::stdout().write_all(&data)?;
        }
        Command::Extract { archive, dest, all } => {
            let reader = open(&archive, password)?;
            for entry in contents(&reader, all)? {
                let Some(target) = destination(&dest, entry.name()) else {
                    warn!("skipping {}: path escapes the destination", entry.name());
                    continue;
                };
                entry
                    .write_to(&target)
                    .with_context(|| format!("extracting {}", entry.name()))?;
                println!("{}", target.display());
            }
        }
        Command::CheckEncrypted { archive } => {
            let encrypted = open(&archive, password)?.check_encrypted()?;
            println!("{}", if encrypted { "encrypted" } else { "not encrypted" });
            if !encrypted {
                std::process::exit(1);
            }
        }
        Command::ValidatePassword { archive, candidate } => {
            let valid = open(&archive, None)?.validate_password(&candidate)?;
            println!("{}", if valid { "valid" } else { "invalid" });
            if !valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_cli() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_global_password() {
        let app = App::try_parse_from(["arkctl", "list", "a.zip", "--password", "1234", "--all"])
            .unwrap();
        assert_eq!(app.password.as_deref(), Some("1234"));
        match app.cmd {
            Command::List { archive, all, long } => {
                assert_eq!(archive, PathBuf::from("a.zip"));
                assert!(all);
                assert!(!long);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_destination() {
        let dest = Path::new("/tmp/out");
        assert_eq!(
            destination(dest, "kr/a.txt"),
            Some(PathBuf::from("/tmp/out/kr/a.txt"))
        );
        assert_eq!(destination(dest, "./a"), Some(PathBuf::from("/tmp/out/./a")));
        assert_eq!(destination(dest, "../escape"), None);
        assert_eq!(destination(dest, "kr/../../escape"), None);
        assert_eq!(destination(dest, "/etc/passwd"), None);
    }

    #[test]
    fn test_type_char() {
        assert_eq!(type_char(ContentType::Directory), 'd');
        assert_eq!(type_char(ContentType::SymbolicLink), 'l');
    }
}
