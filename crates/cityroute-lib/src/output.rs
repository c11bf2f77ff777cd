use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{CityIndex, Coordinate, EdgeWeights, RouteGraph};
use crate::routing::{RouteAlgorithm, RouteObjective, RoutePlan};

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Header plus one line per step with leg and cumulative weights.
    PlainText,
    /// Header plus the path joined on a single line.
    Compact,
}

/// Endpoint within a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEndpoint {
    pub index: CityIndex,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}

/// City visited along a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    /// Position of the step within the route, starting at 0.
    pub position: usize,
    pub index: CityIndex,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    /// Weights of the route that led here; absent for the first step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg: Option<EdgeWeights>,
    /// Running totals from the start up to and including this step.
    pub cumulative: EdgeWeights,
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub objective: RouteObjective,
    pub algorithm: RouteAlgorithm,
    pub hops: usize,
    pub start: RouteEndpoint,
    pub goal: RouteEndpoint,
    pub steps: Vec<RouteStep>,
    pub totals: EdgeWeights,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a summary with resolved names and per-leg weights.
    pub fn from_plan(graph: &RouteGraph, plan: &RoutePlan) -> Result<Self> {
        let mut steps = Vec::with_capacity(plan.steps.len());
        let mut cumulative = EdgeWeights::default();
        let mut previous: Option<CityIndex> = None;

        for (position, &index) in plan.steps.iter().enumerate() {
            let leg = previous.and_then(|prev| graph.edge_between(prev, index).copied());
            if let Some(weights) = leg {
                cumulative += weights;
            }
            steps.push(RouteStep {
                position,
                index,
                name: display_name(graph, index),
                coordinate: graph.coordinate_at(index),
                leg,
                cumulative,
            });
            previous = Some(index);
        }

        let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
            return Err(Error::EmptyRoutePlan);
        };
        let start = RouteEndpoint {
            index: first.index,
            name: first.name.clone(),
            coordinate: first.coordinate,
        };
        let goal = RouteEndpoint {
            index: last.index,
            name: last.name.clone(),
            coordinate: last.coordinate,
        };

        Ok(Self {
            objective: plan.objective,
            algorithm: plan.algorithm,
            hops: plan.hop_count(),
            start,
            goal,
            steps,
            totals: plan.totals,
        })
    }

    /// City names along the route, start first.
    pub fn path_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name.as_str()).collect()
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::Compact => self.render_compact(),
        }
    }

    fn render_header(&self, buffer: &mut String) {
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({} hops, objective: {}, algorithm: {})",
            self.start.name, self.goal.name, self.hops, self.objective, self.algorithm
        );
    }

    fn render_totals(&self, buffer: &mut String) {
        let _ = writeln!(
            buffer,
            "Total: {:.1} km, {:.2} h, cost {:.2}",
            self.totals.distance, self.totals.time, self.totals.cost
        );
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        self.render_header(&mut buffer);
        for step in &self.steps {
            match step.leg {
                Some(leg) => {
                    let _ = writeln!(
                        buffer,
                        "{:>3}: {} (+{:.1} km, +{:.2} h, +{:.2})",
                        step.position, step.name, leg.distance, leg.time, leg.cost
                    );
                }
                None => {
                    let _ = writeln!(buffer, "{:>3}: {}", step.position, step.name);
                }
            }
        }
        self.render_totals(&mut buffer);
        buffer
    }

    fn render_compact(&self) -> String {
        let mut buffer = String::new();
        self.render_header(&mut buffer);
        let _ = writeln!(buffer, "{}", self.path_names().join(" -> "));
        self.render_totals(&mut buffer);
        buffer
    }
}

fn display_name(graph: &RouteGraph, index: CityIndex) -> String {
    graph.name_of(index).unwrap_or("<unknown>").to_string()
}
