//! graph6 / sparse6 / digraph6 codecs (spec.md SPEC_FULL §4.12).
//!
//! These are the classical nauty interchange formats: a variable-length
//! size prefix `N(n)` followed by a payload packed 6 bits per byte, each
//! byte biased by `+63` so it prints as visible ASCII. graph6 stores the
//! upper triangle of an undirected adjacency matrix; digraph6 stores the
//! full matrix (and is prefixed with `&`); sparse6 stores an edge list
//! using an incremental current-vertex encoding (prefixed with `:`) and is
//! normally far smaller for sparse graphs.

use crate::error::{Error, Result};
use crate::graph::{DenseGraph, GraphOps};

const BIAS: u8 = 63;
const SMALL_N_MAX: usize = 62;
const MEDIUM_N_MAX: usize = 258_047;

/// Encodes `n` as graph6/sparse6's variable-length `N(n)`.
fn encode_n(n: usize, out: &mut Vec<u8>) {
    if n <= SMALL_N_MAX {
        out.push(n as u8 + BIAS);
    } else if n <= MEDIUM_N_MAX {
        out.push(126);
        push_k_bits(out_as_bitvec(n, 18).into_iter(), out);
    } else {
        out.push(126);
        out.push(126);
        push_k_bits(out_as_bitvec(n, 36).into_iter(), out);
    }
}

/// Splits `value` into `bits` bits, most significant first.
fn out_as_bitvec(value: usize, bits: usize) -> Vec<bool> {
    (0..bits).map(|i| (value >> (bits - 1 - i)) & 1 == 1).collect()
}

/// Packs a bit sequence into 6-bit groups, each biased by `+63`, padding the
/// final group with `1` bits.
fn push_k_bits(bits: impl Iterator<Item = bool>, out: &mut Vec<u8>) {
    let mut buf: Vec<bool> = bits.collect();
    while buf.len() % 6 != 0 {
        buf.push(true);
    }
    for chunk in buf.chunks(6) {
        let mut byte = 0u8;
        for &b in chunk {
            byte = (byte << 1) | b as u8;
        }
        out.push(byte + BIAS);
    }
}

/// Reads `N(n)` from `data` starting at `*pos`, advancing `*pos` past it.
fn decode_n(data: &[u8], pos: &mut usize, format: &'static str) -> Result<usize> {
    let byte_at = |p: usize| -> Result<u8> {
        data.get(p).copied().ok_or(Error::Decode { format, offset: p, message: "unexpected end of input".into() })
    };
    let first = byte_at(*pos)?;
    if first != 126 {
        *pos += 1;
        return Ok((first - BIAS) as usize);
    }
    let second = byte_at(*pos + 1)?;
    if second != 126 {
        let mut value = 0usize;
        for i in 0..3 {
            value = (value << 6) | (byte_at(*pos + 1 + i)? - BIAS) as usize;
        }
        *pos += 4;
        Ok(value)
    } else {
        let mut value = 0usize;
        for i in 0..6 {
            value = (value << 6) | (byte_at(*pos + 2 + i)? - BIAS) as usize;
        }
        *pos += 8;
        Ok(value)
    }
}

/// A bit reader over the 6-bit groups of a graph6-family payload.
struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, byte_pos: 0, bit_pos: 0 }
    }

    fn bits_remaining(&self) -> usize {
        (self.data.len().saturating_sub(self.byte_pos)) * 6 - self.bit_pos as usize
    }

    fn next_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.byte_pos)?;
        let bit = (byte - BIAS) & (1 << (5 - self.bit_pos)) != 0;
        self.bit_pos += 1;
        if self.bit_pos == 6 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        Some(bit)
    }

    fn next_k_bits(&mut self, k: usize) -> Option<usize> {
        if self.bits_remaining() < k {
            return None;
        }
        let mut value = 0usize;
        for _ in 0..k {
            value = (value << 1) | self.next_bit()? as usize;
        }
        Some(value)
    }
}

fn bits_for(n: usize) -> usize {
    let mut k = 1;
    while (1usize << k) < n.max(1) {
        k += 1;
    }
    k.max(1)
}

/// Encodes `g` as graph6 text (no trailing newline, no header).
pub fn to_graph6(g: &DenseGraph) -> String {
    let n = g.n();
    let mut out = Vec::new();
    encode_n(n, &mut out);
    let mut bits = Vec::with_capacity(n * n / 2);
    for j in 1..n {
        for i in 0..j {
            bits.push(g.has_edge(i, j));
        }
    }
    push_k_bits(bits.into_iter(), &mut out);
    String::from_utf8(out).expect("graph6 payload is always ASCII")
}

/// Decodes a graph6 line (header, if present, must already be stripped).
pub fn from_graph6(line: &str) -> Result<DenseGraph> {
    let data = line.trim_end().as_bytes();
    let mut pos = 0;
    let n = decode_n(data, &mut pos, "graph6")?;
    let mut reader = BitReader::new(&data[pos..]);
    let mut edges = Vec::new();
    for j in 1..n {
        for i in 0..j {
            match reader.next_bit() {
                Some(true) => edges.push((i, j)),
                Some(false) => {}
                None => {
                    return Err(Error::Decode {
                        format: "graph6",
                        offset: pos,
                        message: "payload shorter than upper-triangle bit count".into(),
                    });
                }
            }
        }
    }
    DenseGraph::from_edges(n, &edges, false)
}

/// Encodes `g` as digraph6 text, including the leading `&`.
pub fn to_digraph6(g: &DenseGraph) -> String {
    let n = g.n();
    let mut out = vec![b'&'];
    encode_n(n, &mut out);
    let mut bits = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            bits.push(g.has_edge(i, j));
        }
    }
    push_k_bits(bits.into_iter(), &mut out);
    String::from_utf8(out).expect("digraph6 payload is always ASCII")
}

/// Decodes a digraph6 line; the leading `&` must still be present.
pub fn from_digraph6(line: &str) -> Result<DenseGraph> {
    let trimmed = line.trim_end();
    let rest = trimmed.strip_prefix('&').ok_or_else(|| Error::Decode {
        format: "digraph6",
        offset: 0,
        message: "missing leading '&'".into(),
    })?;
    let data = rest.as_bytes();
    let mut pos = 0;
    let n = decode_n(data, &mut pos, "digraph6")?;
    let mut reader = BitReader::new(&data[pos..]);
    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            match reader.next_bit() {
                Some(true) => edges.push((i, j)),
                Some(false) => {}
                None => {
                    return Err(Error::Decode {
                        format: "digraph6",
                        offset: pos,
                        message: "payload shorter than n*n bit count".into(),
                    });
                }
            }
        }
    }
    DenseGraph::from_edges(n, &edges, true)
}

/// Encodes `g` as sparse6 text, including the leading `:`.
pub fn to_sparse6(g: &DenseGraph) -> String {
    let n = g.n();
    let k = bits_for(n);
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for j in 0..n {
        for i in 0..=j {
            if g.has_edge(i, j) {
                edges.push((i, j));
            }
        }
    }
    edges.sort_unstable();

    let mut bits: Vec<bool> = Vec::new();
    let mut cur = 0usize;
    for (lo, hi) in edges {
        if hi == cur {
            bits.push(false);
            bits.extend(out_as_bitvec(lo, k));
        } else if hi == cur + 1 {
            bits.push(true);
            bits.extend(out_as_bitvec(lo, k));
            cur = hi;
        } else {
            bits.push(true);
            bits.extend(out_as_bitvec(hi, k));
            bits.push(false);
            bits.extend(out_as_bitvec(lo, k));
            cur = hi;
        }
    }

    let mut out = vec![b':'];
    encode_n(n, &mut out);
    push_k_bits(bits.into_iter(), &mut out);
    String::from_utf8(out).expect("sparse6 payload is always ASCII")
}

/// Decodes a sparse6 line; the leading `:` must still be present.
pub fn from_sparse6(line: &str) -> Result<DenseGraph> {
    let trimmed = line.trim_end();
    let rest = trimmed.strip_prefix(':').ok_or_else(|| Error::Decode {
        format: "sparse6",
        offset: 0,
        message: "missing leading ':'".into(),
    })?;
    let data = rest.as_bytes();
    let mut pos = 0;
    let n = decode_n(data, &mut pos, "sparse6")?;
    let k = bits_for(n);
    let mut reader = BitReader::new(&data[pos..]);

    let mut v = 0usize;
    let mut edges = Vec::new();
    loop {
        let Some(b) = reader.next_bit() else { break };
        let Some(x) = reader.next_k_bits(k) else { break };
        if b {
            v += 1;
        }
        if x > v {
            v = x;
        } else {
            edges.push((x, v));
        }
        if v >= n {
            break;
        }
    }
    DenseGraph::from_edges(n, &edges, false)
}

/// Strips a leading `>>graph6<<`, `>>sparse6<<`, or `>>digraph6<<` header if
/// present, per spec.md's optional-header allowance.
pub fn strip_header(line: &str) -> &str {
    for header in [">>graph6<<", ">>sparse6<<", ">>digraph6<<"] {
        if let Some(rest) = line.strip_prefix(header) {
            return rest;
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph6_roundtrip_k4() {
        let g = DenseGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)], false).unwrap();
        let text = to_graph6(&g);
        let back = from_graph6(&text).unwrap();
        assert!(g.structurally_equal(&back));
    }

    #[test]
    fn graph6_roundtrip_edgeless() {
        let g = DenseGraph::empty(5, false);
        let text = to_graph6(&g);
        let back = from_graph6(&text).unwrap();
        assert!(g.structurally_equal(&back));
    }

    #[test]
    fn digraph6_roundtrip_directed_cycle() {
        let g = DenseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)], true).unwrap();
        let text = to_digraph6(&g);
        assert!(text.starts_with('&'));
        let back = from_digraph6(&text).unwrap();
        assert!(g.structurally_equal(&back));
    }

    #[test]
    fn sparse6_roundtrip_petersen_like_graph() {
        let edges = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2)];
        let g = DenseGraph::from_edges(5, &edges, false).unwrap();
        let text = to_sparse6(&g);
        assert!(text.starts_with(':'));
        let back = from_sparse6(&text).unwrap();
        assert!(g.structurally_equal(&back));
    }

    #[test]
    fn sparse6_roundtrip_with_nonconsecutive_jump() {
        // Forces the w > cur+1 branch: edge (0, 9) after nothing else near vertex 9.
        let g = DenseGraph::from_edges(10, &[(0, 9), (1, 2)], false).unwrap();
        let text = to_sparse6(&g);
        let back = from_sparse6(&text).unwrap();
        assert!(g.structurally_equal(&back));
    }

    #[test]
    fn header_stripping_is_idempotent_when_absent() {
        assert_eq!(strip_header("A?"), "A?");
        assert_eq!(strip_header(">>graph6<<A?"), "A?");
    }

    #[test]
    fn decode_n_handles_small_and_medium_sizes() {
        let mut out = Vec::new();
        encode_n(62, &mut out);
        let mut pos = 0;
        assert_eq!(decode_n(&out, &mut pos, "graph6").unwrap(), 62);

        let mut out2 = Vec::new();
        encode_n(1000, &mut out2);
        let mut pos2 = 0;
        assert_eq!(decode_n(&out2, &mut pos2, "graph6").unwrap(), 1000);
    }
}
