use std::collections::HashMap;

use serde::Serialize;
use strsim::jaro_winkler;

use crate::error::{Error, Result};

/// Dense, zero-based index of a city within a [`RouteGraph`].
pub type CityIndex = usize;

/// Smallest row stride allocated once the first city is added.
const MIN_STRIDE: usize = 8;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const FUZZY_MATCH_THRESHOLD: f64 = 0.8;

/// Geographic position of a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Cost of travelling a route in each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EdgeWeights {
    /// Kilometres.
    pub distance: f64,
    /// Hours.
    pub time: f64,
    /// Monetary cost in the table's currency.
    pub cost: f64,
}

impl EdgeWeights {
    pub fn new(distance: f64, time: f64, cost: f64) -> Self {
        Self {
            distance,
            time,
            cost,
        }
    }
}

impl std::ops::AddAssign for EdgeWeights {
    fn add_assign(&mut self, other: Self) {
        self.distance += other.distance;
        self.time += other.time;
        self.cost += other.cost;
    }
}

/// Borrowed view of a city used for listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City<'a> {
    pub index: CityIndex,
    pub name: &'a str,
    pub coordinate: Option<Coordinate>,
}

/// Square adjacency matrix stored row-major in a single allocation.
///
/// The stride doubles when the vertex count outgrows it so that incremental
/// loading stays amortized.
#[derive(Debug, Clone, Default)]
struct AdjacencyMatrix {
    stride: usize,
    cells: Vec<Option<EdgeWeights>>,
}

impl AdjacencyMatrix {
    fn ensure_capacity(&mut self, vertices: usize) {
        if vertices <= self.stride {
            return;
        }

        let stride = vertices.max(self.stride * 2).max(MIN_STRIDE);
        let mut cells = vec![None; stride * stride];
        for row in 0..self.stride {
            let old = &self.cells[row * self.stride..(row + 1) * self.stride];
            cells[row * stride..row * stride + self.stride].copy_from_slice(old);
        }

        self.stride = stride;
        self.cells = cells;
    }

    fn get(&self, i: CityIndex, j: CityIndex) -> Option<&EdgeWeights> {
        self.cells[i * self.stride + j].as_ref()
    }

    /// Store `weights` for the unordered pair, returning whether the pair was new.
    fn set_symmetric(&mut self, i: CityIndex, j: CityIndex, weights: EdgeWeights) -> bool {
        let is_new = self.cells[i * self.stride + j].is_none();
        self.cells[i * self.stride + j] = Some(weights);
        self.cells[j * self.stride + i] = Some(weights);
        is_new
    }
}

/// Undirected route network between named cities.
///
/// Cities receive dense indices in insertion order. At most one route exists
/// between any pair of cities; adding a route again replaces its weights.
/// Once loaded the graph is treated as immutable and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    names: Vec<String>,
    index: HashMap<String, CityIndex>,
    coordinates: Vec<Option<Coordinate>>,
    adjacency: AdjacencyMatrix,
    edge_count: usize,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a city, returning its index.
    ///
    /// Adding a name that already exists is a no-op: the original index and
    /// coordinate are kept.
    pub fn add_vertex(&mut self, name: &str, coordinate: Option<Coordinate>) -> CityIndex {
        if let Some(&existing) = self.index.get(name) {
            return existing;
        }

        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        self.coordinates.push(coordinate);
        self.adjacency.ensure_capacity(self.names.len());
        idx
    }

    /// Set the route between two registered cities, replacing any previous one.
    pub fn add_edge(&mut self, source: &str, target: &str, weights: EdgeWeights) -> Result<()> {
        let i = self.require_index(source)?;
        let j = self.require_index(target)?;
        if i == j {
            return Err(Error::SelfLoop {
                name: source.to_string(),
            });
        }

        if self.adjacency.set_symmetric(i, j, weights) {
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Number of cities.
    pub fn vertex_count(&self) -> usize {
        self.names.len()
    }

    /// Number of distinct routes.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn has_vertex(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Lookup a city index by its case-sensitive name.
    pub fn index_of(&self, name: &str) -> Option<CityIndex> {
        self.index.get(name).copied()
    }

    /// Lookup a city name by index.
    pub fn name_of(&self, index: CityIndex) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Coordinate recorded for `name`, if the city exists and had one.
    pub fn coordinate_of(&self, name: &str) -> Option<Coordinate> {
        self.index_of(name).and_then(|idx| self.coordinate_at(idx))
    }

    pub fn coordinate_at(&self, index: CityIndex) -> Option<Coordinate> {
        self.coordinates.get(index).copied().flatten()
    }

    /// Weights of the route between two indices, if one exists.
    pub fn edge_between(&self, a: CityIndex, b: CityIndex) -> Option<&EdgeWeights> {
        if a >= self.vertex_count() || b >= self.vertex_count() {
            return None;
        }
        self.adjacency.get(a, b)
    }

    /// Routes leaving `index`, in ascending neighbour index order.
    pub fn neighbours(&self, index: CityIndex) -> impl Iterator<Item = (CityIndex, &EdgeWeights)> {
        let count = if index < self.vertex_count() {
            self.vertex_count()
        } else {
            0
        };
        (0..count).filter_map(move |other| self.adjacency.get(index, other).map(|w| (other, w)))
    }

    /// All cities in insertion order.
    pub fn cities(&self) -> impl Iterator<Item = City<'_>> {
        self.names.iter().enumerate().map(|(index, name)| City {
            index,
            name: name.as_str(),
            coordinate: self.coordinates[index],
        })
    }

    /// Suggest up to `limit` known city names resembling `name`.
    ///
    /// Matching is case-insensitive; results are ordered by similarity and
    /// then insertion order.
    pub fn fuzzy_city_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, CityIndex)> = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(idx, candidate)| {
                let score = jaro_winkler(&needle, &candidate.to_lowercase());
                (score >= FUZZY_MATCH_THRESHOLD).then_some((score, idx))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, idx)| self.names[idx].clone())
            .collect()
    }

    /// Resolve a city name or fail with suggestions attached.
    pub fn require_index(&self, name: &str) -> Result<CityIndex> {
        self.index_of(name).ok_or_else(|| Error::UnknownCity {
            name: name.to_string(),
            suggestions: self.fuzzy_city_matches(name, 3),
        })
    }
}
