//! Disk persistence for the raft log, hardstate, and snapshot metadata.
//!
//! `raft::storage::MemStorage` holds everything in RAM; this module mirrors
//! every entry/hardstate/snapshot write it receives onto flat files under
//! `data_dir`, and reloads them at startup, so a replica restart doesn't
//! lose its replicated log. Layout:
//!
//! ```text
//! {data_dir}/
//! ├── entries.log     <- length-prefixed protobuf log entries, oldest first
//! ├── hardstate.bin   <- latest HardState (whole-file rewrite)
//! └── snapshot.bin    <- last applied inbound Snapshot, if any
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use protobuf::Message as _;
use raft::prelude::{Entry, HardState, Snapshot};

pub struct PersistentLog {
    dir: PathBuf,
}

impl PersistentLog {
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entries_path(&self) -> PathBuf {
        self.dir.join("entries.log")
    }

    fn hardstate_path(&self) -> PathBuf {
        self.dir.join("hardstate.bin")
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join("snapshot.bin")
    }

    /// Appends newly-written entries to the on-disk log tail, in order.
    pub fn append_entries(&self, entries: &[Entry]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().create(true).append(true).open(self.entries_path())?;
        for entry in entries {
            write_entry(&mut file, entry)?;
        }
        file.flush()
    }

    /// Overwrites the hardstate file. Small and infrequent enough that a
    /// whole-file rewrite is simpler than an append log.
    pub fn persist_hardstate(&self, hardstate: &HardState) -> io::Result<()> {
        atomic_write(&self.hardstate_path(), &hardstate.write_to_bytes().expect("hardstate encodes"))
    }

    pub fn persist_snapshot(&self, snapshot: &Snapshot) -> io::Result<()> {
        atomic_write(&self.snapshot_path(), &snapshot.write_to_bytes().expect("snapshot encodes"))
    }

    /// Rewrites the entries log from whatever the caller says survived a
    /// compaction, mirroring `MemStorageCore::compact`'s in-memory trim.
    pub fn compact(&self, surviving: &[Entry]) -> io::Result<()> {
        let tmp = self.dir.join("entries.log.tmp");
        {
            let mut file = File::create(&tmp)?;
            for entry in surviving {
                write_entry(&mut file, entry)?;
            }
            file.flush()?;
        }
        fs::rename(tmp, self.entries_path())
    }

    /// Reloads everything persisted so far: the log tail, the last known
    /// hardstate, and the last applied snapshot, if any. A replica
    /// starting against an empty data directory gets defaults for all
    /// three.
    pub fn load(&self) -> io::Result<(Vec<Entry>, HardState, Option<Snapshot>)> {
        let entries = read_entries(&self.entries_path())?;
        let hardstate = read_hardstate(&self.hardstate_path())?.unwrap_or_default();
        let snapshot = read_snapshot(&self.snapshot_path())?;
        Ok((entries, hardstate, snapshot))
    }
}

fn write_entry(file: &mut File, entry: &Entry) -> io::Result<()> {
    let bytes = entry.write_to_bytes().expect("raft entry encodes");
    file.write_all(&(bytes.len() as u32).to_be_bytes())?;
    file.write_all(&bytes)
}

fn read_entries(path: &Path) -> io::Result<Vec<Entry>> {
    let Ok(buf) = fs::read(path) else { return Ok(Vec::new()) };
    let mut entries = Vec::new();
    let mut offset = 0;
    while offset + 4 <= buf.len() {
        let len = u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
        offset += 4;
        if offset + len > buf.len() {
            break;
        }
        entries.push(Entry::parse_from_bytes(&buf[offset..offset + len]).map_err(to_io)?);
        offset += len;
    }
    Ok(entries)
}

fn read_hardstate(path: &Path) -> io::Result<Option<HardState>> {
    match fs::read(path) {
        Ok(bytes) => HardState::parse_from_bytes(&bytes).map(Some).map_err(to_io),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn read_snapshot(path: &Path) -> io::Result<Option<Snapshot>> {
    match fs::read(path) {
        Ok(bytes) => Snapshot::parse_from_bytes(&bytes).map(Some).map_err(to_io),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(tmp, path)
}

fn to_io(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err.to_string())
}
