//! Primitive topologies and their generated vertex positions.
//!
//! Every topology lays positions out in normalised `[0, 1]` space; the
//! vertex shader maps them to clip space. The default triangle is the
//! oversized fullscreen triangle.

use serde::{Deserialize, Serialize};

/// Positions of the fullscreen triangle.
pub const TRIANGLE_POSITIONS: [f32; 6] = [-2.0, 0.0, 0.0, -2.0, 2.0, 2.0];

/// Keeps line endpoints off the exact frame edge.
const EDGE_NEAR: f32 = 0.0001;
const EDGE_FAR: f32 = 0.9999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    #[serde(rename = "triangles")]
    Triangles,
    #[serde(rename = "points")]
    Points,
    #[serde(rename = "line strip")]
    LineStrip,
    #[serde(rename = "line loop")]
    LineLoop,
    #[serde(rename = "lines")]
    Lines,
}

impl Topology {
    /// Parses a topology name; unknown names fall back to triangles.
    pub fn parse(name: &str) -> Self {
        match name {
            "triangles" => Topology::Triangles,
            "points" => Topology::Points,
            "line strip" => Topology::LineStrip,
            "line loop" => Topology::LineLoop,
            "lines" => Topology::Lines,
            other => {
                tracing::warn!(topology = other, "unknown primitive topology, drawing triangles");
                Topology::Triangles
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Topology::Triangles => "triangles",
            Topology::Points => "points",
            Topology::LineStrip => "line strip",
            Topology::LineLoop => "line loop",
            Topology::Lines => "lines",
        }
    }

    pub fn is_line(self) -> bool {
        matches!(self, Topology::LineStrip | Topology::LineLoop | Topology::Lines)
    }
}

/// Requested item count: a single number or a `[n, m]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemCount {
    Single(usize),
    Pair([usize; 2]),
}

impl Default for ItemCount {
    fn default() -> Self {
        ItemCount::Single(1)
    }
}

impl ItemCount {
    /// Expands to a pair, using `second` for the missing dimension of a
    /// single count (`None` repeats the first).
    fn pair(self, second: Option<usize>) -> (usize, usize) {
        match self {
            ItemCount::Pair([a, b]) => (a, b),
            ItemCount::Single(n) => (n, second.unwrap_or(n)),
        }
    }
}

/// Vertex positions (two floats per vertex) and the vertex count.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub positions: Vec<f32>,
    pub count: usize,
}

/// Generates the vertex layout for a topology.
pub fn attributes(topology: Topology, items: ItemCount) -> Attributes {
    match topology {
        Topology::Triangles => Attributes {
            positions: TRIANGLE_POSITIONS.to_vec(),
            count: 3,
        },
        Topology::Points => points(grid(topology, items.pair(None))),
        Topology::LineStrip => strip(grid(topology, items.pair(Some(1))), false),
        Topology::LineLoop => strip(grid(topology, items.pair(Some(1))), true),
        Topology::Lines => match items.pair(Some(0)) {
            (0, 0) => {
                tracing::warn!(topology = topology.as_str(), "zero line count, drawing one vertical line");
                lines((1, 0))
            }
            pair => lines(pair),
        },
    }
}

/// Grid dimensions with each side at least 1.
fn grid(topology: Topology, (n, m): (usize, usize)) -> (usize, usize) {
    if n == 0 || m == 0 {
        tracing::warn!(topology = topology.as_str(), n, m, "zero item count, clamping to 1");
    }
    (n.max(1), m.max(1))
}

/// An `n x m` grid of points at cell centres.
fn points((n, m): (usize, usize)) -> Attributes {
    let count = n * m;
    let mut positions = Vec::with_capacity(count * 2);
    for p in 0..count {
        positions.push(((p % n) as f32 + 0.5) / n as f32);
        positions.push(((p / n) as f32 + 0.5) / m as f32);
    }
    Attributes { positions, count }
}

/// `m` rows of `n` vertices. An open strip spans the full width; a closed
/// loop leaves room for the closing segment.
fn strip((n, m): (usize, usize), closed: bool) -> Attributes {
    let count = n * m;
    let span = if closed { n } else { n.saturating_sub(1).max(1) } as f32;
    let mut positions = Vec::with_capacity(count * 2);
    for p in 0..count {
        positions.push((p % n) as f32 / span);
        positions.push((p / n) as f32 / m as f32);
    }
    Attributes { positions, count }
}

/// `h` vertical lines followed by `v` horizontal lines, two vertices each.
fn lines((h, v): (usize, usize)) -> Attributes {
    let count = 2 * (h + v);
    let mut positions = Vec::with_capacity(count * 2);
    for i in 0..h {
        let x = (i as f32 + 0.5) / h as f32;
        positions.extend_from_slice(&[x, EDGE_NEAR, x, EDGE_FAR]);
    }
    for q in 0..v {
        let y = (q as f32 + 0.5) / v as f32;
        positions.extend_from_slice(&[EDGE_NEAR, y, EDGE_FAR, y]);
    }
    Attributes { positions, count }
}
