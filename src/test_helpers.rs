//! Shared fixtures for tests: declarative directory trees and real JPEGs.

use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write a real JPEG gradient at `path`, creating parent directories.
pub(crate) fn write_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// One node of a declarative directory fixture. Build with [`file`],
/// [`media_file`] and [`dir`], materialize with [`tree`].
#[derive(Clone)]
pub(crate) enum Node {
    /// Placeholder file of a given size. The path may contain `/` to
    /// create intermediate directories.
    File { path: String, size: u64 },
    /// A real decodable JPEG.
    Media { path: String },
    Dir { name: String, children: Vec<Node> },
}

pub(crate) fn file(path: &str, size: u64) -> Node {
    Node::File {
        path: path.to_string(),
        size,
    }
}

pub(crate) fn media_file(path: &str) -> Node {
    Node::Media {
        path: path.to_string(),
    }
}

pub(crate) fn dir(name: &str, children: &[Node]) -> Node {
    Node::Dir {
        name: name.to_string(),
        children: children.to_vec(),
    }
}

/// Materialize a fixture tree in a fresh temp directory.
pub(crate) fn tree(nodes: &[Node]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    materialize(tmp.path(), nodes);
    tmp
}

fn materialize(base: &Path, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::File { path, size } => {
                let dest = base.join(path);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&dest, vec![b'x'; *size as usize]).unwrap();
            }
            Node::Media { path } => {
                write_jpeg(&base.join(path), 640, 480);
            }
            Node::Dir { name, children } => {
                let sub = base.join(name);
                fs::create_dir_all(&sub).unwrap();
                materialize(&sub, children);
            }
        }
    }
}
