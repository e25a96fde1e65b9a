//! Binary save file holding per-user best scores.
//!
//! Layout (little-endian):
//! ```text
//! magic "T2S1" | version u8 | endian u8 | user_count u8
//! user_count x { name_len u16 | name utf-8 | best_score u64 | max_merges u8 }
//! crc32c u32 over every preceding byte
//! ```
//!
//! Grid state is never stored. A missing or damaged file reads as an empty
//! save so a session can always start.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"T2S1";
const VERSION: u8 = 1;
const ENDIAN_LE: u8 = 0;
const HEADER_LEN: usize = 4 + 1 + 1 + 1;
const CHECKSUM_LEN: usize = 4;

/// Default save file name, relative to the working directory.
pub const DEFAULT_SAVE_PATH: &str = ".cl2048_save";

#[derive(thiserror::Error, Debug)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("unsupported endianness")]
    Endianness,
    #[error("file too short or malformed")]
    Malformed,
    #[error("checksum mismatch")]
    Checksum,
    #[error("save file holds at most {} users", u8::MAX)]
    TooManyUsers,
    #[error("user name is longer than {} bytes", u16::MAX)]
    NameTooLong,
}

/// Best results of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub best_score: u64,
    pub max_merges_per_move: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveFile {
    users: Vec<UserRecord>,
}

impl SaveFile {
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn user(&self, username: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Stored best score for `username`, 0 when unknown.
    pub fn best_score(&self, username: &str) -> u64 {
        self.user(username).map_or(0, |u| u.best_score)
    }

    /// Fold a finished session into the save. The best score only changes
    /// when `score` beats it; returns whether it did.
    pub fn record_session(&mut self, username: &str, score: u64, max_merges: u8) -> bool {
        let record = match self.users.iter().position(|u| u.username == username) {
            Some(idx) => &mut self.users[idx],
            None => {
                self.users.push(UserRecord {
                    username: username.to_string(),
                    best_score: 0,
                    max_merges_per_move: 0,
                });
                let last = self.users.len() - 1;
                &mut self.users[last]
            }
        };
        record.max_merges_per_move = record.max_merges_per_move.max(max_merges);
        if score > record.best_score {
            record.best_score = score;
            true
        } else {
            false
        }
    }

    /// Read a save, falling back to an empty one on any failure.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> SaveFile {
        let path = path.as_ref();
        match read_from_path(path) {
            Ok(save) => save,
            Err(SaveError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no save file at {}, starting fresh", path.display());
                SaveFile::default()
            }
            Err(e) => {
                log::warn!("ignoring unreadable save file {}: {e}", path.display());
                SaveFile::default()
            }
        }
    }
}

#[inline]
fn read_u16_le(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?))
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?))
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> Option<u64> {
    Some(u64::from_le_bytes(bytes.get(..8)?.try_into().ok()?))
}

pub fn encode_save(save: &SaveFile) -> Result<Vec<u8>, SaveError> {
    let user_count: u8 = save.users.len().try_into().map_err(|_| SaveError::TooManyUsers)?;

    let mut buf = Vec::with_capacity(HEADER_LEN + save.users.len() * 32 + CHECKSUM_LEN);
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.push(ENDIAN_LE);
    buf.push(user_count);

    for user in &save.users {
        let name = user.username.as_bytes();
        let name_len: u16 = name.len().try_into().map_err(|_| SaveError::NameTooLong)?;
        buf.extend_from_slice(&name_len.to_le_bytes());
        buf.extend_from_slice(name);
        buf.extend_from_slice(&user.best_score.to_le_bytes());
        buf.push(user.max_merges_per_move);
    }

    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn parse_save_bytes(bytes: &[u8]) -> Result<SaveFile, SaveError> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(SaveError::Malformed);
    }

    // Checksum first so a damaged file never yields partial records
    let (content, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let file_crc = read_u32_le(trailer).ok_or(SaveError::Malformed)?;
    if file_crc != crc32c::crc32c(content) {
        return Err(SaveError::Checksum);
    }

    if &content[..4] != MAGIC || content[4] != VERSION {
        return Err(SaveError::MagicOrVersion);
    }
    if content[5] != ENDIAN_LE {
        return Err(SaveError::Endianness);
    }
    let user_count = content[6] as usize;

    let mut off = HEADER_LEN;
    let mut users = Vec::with_capacity(user_count);
    for _ in 0..user_count {
        let name_len = read_u16_le(&content[off..]).ok_or(SaveError::Malformed)? as usize;
        off += 2;
        let name = content.get(off..off + name_len).ok_or(SaveError::Malformed)?;
        let username = std::str::from_utf8(name).map_err(|_| SaveError::Malformed)?.to_string();
        off += name_len;
        let best_score = read_u64_le(&content[off..]).ok_or(SaveError::Malformed)?;
        off += 8;
        let max_merges_per_move = *content.get(off).ok_or(SaveError::Malformed)?;
        off += 1;
        users.push(UserRecord { username, best_score, max_merges_per_move });
    }

    if off != content.len() {
        return Err(SaveError::Malformed);
    }
    Ok(SaveFile { users })
}

pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<SaveFile, SaveError> {
    let data = fs::read(path)?;
    parse_save_bytes(&data)
}

pub fn write_to_path<P: AsRef<Path>>(path: P, save: &SaveFile) -> Result<(), SaveError> {
    let data = encode_save(save)?;
    let mut f = fs::File::create(path)?;
    f.write_all(&data)?;
    Ok(())
}
