// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file standing in for the memory device, removed when dropped.
pub struct MemFile {
    path: PathBuf,
}

impl MemFile {
    /// Create a zeroed file of `len` bytes.
    pub fn new(name: &str, len: usize) -> MemFile {
        let mut path = std::env::temp_dir();
        path.push(format!("gpiommio-{}-{}", name, std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(&vec![0u8; len]).unwrap();
        MemFile { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the 32-bit word at the given byte offset.
    pub fn word(&self, offset: usize) -> u32 {
        let contents = std::fs::read(&self.path).unwrap();
        let mut w = [0u8; 4];
        w.copy_from_slice(&contents[offset..offset + 4]);
        u32::from_ne_bytes(w)
    }
}

impl Drop for MemFile {
    fn drop(&mut self) {
        _ = std::fs::remove_file(&self.path);
    }
}
