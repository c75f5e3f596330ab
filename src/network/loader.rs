//! Line-oriented network loader.
//!
//! ## Format
//!
//! ```text
//! <#vertices> <preparation>
//! <color> <neighbor> <neighbor> ...     (one line per vertex)
//! ```
//!
//! Adjacency is symmetrized after loading. Malformed content is reported as
//! a warning and replaced by best-effort values; only I/O failures are
//! errors. Loading into a non-empty network appends the new vertices as a
//! disconnected component.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::Network;
use crate::types::{Color, VertexId};

/// Error type for network loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source could not be read.
    #[error("Failed to read network {source_name}: {error}")]
    Io {
        /// File name or other label of the source.
        source_name: String,
        /// Underlying error.
        #[source]
        error: std::io::Error,
    },
}

impl Network {
    /// Load a network from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let mut network = Network::default();
        network.load_into(path)?;
        Ok(network)
    }

    /// Parse a network from an in-memory string.
    pub fn parse_str(text: &str) -> Self {
        let mut network = Network::default();
        network.append_lines(text.lines().map(str::to_string), "<string>");
        network
    }

    /// Append the network stored in a file as a new disconnected component.
    pub fn load_into(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let file = File::open(path).map_err(|error| LoadError::Io {
            source_name: source_name.clone(),
            error,
        })?;
        self.read_into(file, &source_name)
    }

    /// Append a network read from any reader.
    pub fn read_into<R: Read>(&mut self, reader: R, source_name: &str) -> Result<(), LoadError> {
        let lines = BufReader::new(reader)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| LoadError::Io {
                source_name: source_name.to_string(),
                error,
            })?;
        self.append_lines(lines.into_iter(), source_name);
        Ok(())
    }

    fn append_lines<I: Iterator<Item = String>>(&mut self, mut lines: I, source_name: &str) {
        let start = self.len();
        let header = lines.next().unwrap_or_default();
        let mut fields = header.split_whitespace();

        let num_vertices = match fields.next().map(str::parse::<usize>) {
            Some(Ok(n)) => n,
            _ => {
                warn!(source = source_name, "Network header has no valid vertex count");
                0
            }
        };
        match fields.next().map(str::parse::<usize>) {
            Some(Ok(prep)) => self.preparation = prep,
            _ => warn!(
                source = source_name,
                preparation = self.preparation,
                "Network header has no valid preparation, keeping current"
            ),
        }

        for _ in 0..num_vertices {
            self.add_vertex(0);
        }

        for i in 0..num_vertices {
            let id = VertexId::new(start + i);
            let Some(line) = lines.next() else {
                warn!(
                    source = source_name,
                    expected = num_vertices,
                    found = i,
                    "Network file ends early, remaining vertices are isolated"
                );
                break;
            };
            let mut tokens = line.split_whitespace();
            match tokens.next().map(str::parse::<Color>) {
                Some(Ok(color)) => self.vertices[id.index()].color = color,
                _ => warn!(source = source_name, vertex = i, "Vertex line has no valid color"),
            }
            for token in tokens {
                match token.parse::<usize>() {
                    Ok(n) if n < num_vertices && n != i => {
                        self.push_neighbor(id, VertexId::new(start + n));
                    }
                    Ok(n) if n == i => {
                        warn!(source = source_name, vertex = i, "Ignoring self-loop");
                    }
                    _ => warn!(
                        source = source_name,
                        vertex = i,
                        token = token,
                        "Ignoring invalid neighbor index"
                    ),
                }
            }
        }

        self.dedup_neighbors(start);
        self.symmetrize(start);
        debug!(
            source = source_name,
            vertices = num_vertices,
            preparation = self.preparation,
            "Loaded network"
        );
    }

    fn dedup_neighbors(&mut self, start: usize) {
        for vertex in &mut self.vertices[start..] {
            let mut seen = Vec::with_capacity(vertex.neighbors.len());
            vertex.neighbors.retain(|n| {
                if seen.contains(n) {
                    false
                } else {
                    seen.push(*n);
                    true
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_symmetrize() {
        // Edges listed on one side only.
        let network = Network::parse_str("3 1\n0 1\n1 2\n0\n");
        assert_eq!(network.len(), 3);
        assert_eq!(network.preparation(), 1);
        assert_eq!(network.color(VertexId::new(1)), 1);
        assert_eq!(network.neighbors(VertexId::new(0)), &[VertexId::new(1)]);
        assert_eq!(
            network.neighbors(VertexId::new(1)),
            &[VertexId::new(2), VertexId::new(0)]
        );
        assert_eq!(network.neighbors(VertexId::new(2)), &[VertexId::new(1)]);
        assert_eq!(network.num_edges(), 2);
    }

    #[test]
    fn test_malformed_input_is_best_effort() {
        let network = Network::parse_str("3 0\nx 1 9\n0 0 two\n");
        assert_eq!(network.len(), 3);
        // Bad color defaults to 0, out-of-range and garbage neighbors skipped.
        assert_eq!(network.color(VertexId::new(0)), 0);
        assert_eq!(network.neighbors(VertexId::new(0)), &[VertexId::new(1)]);
        // Missing third line leaves an isolated vertex.
        assert_eq!(network.degree(VertexId::new(2)), 0);
    }

    #[test]
    fn test_append_as_disconnected_component() {
        let mut network = Network::parse_str("2 0\n0 1\n0 0\n");
        network
            .read_into("2 3\n1 1\n1 0\n".as_bytes(), "second")
            .unwrap();
        assert_eq!(network.len(), 4);
        assert_eq!(network.preparation(), 3);
        assert_eq!(network.neighbors(VertexId::new(2)), &[VertexId::new(3)]);
        assert_eq!(network.neighbors(VertexId::new(1)), &[VertexId::new(0)]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = Network::load("/definitely/not/here.cfg").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
