//! Scripted marker and zone sessions loaded from TOML.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use surveyor_geom::{Axis, BlockPos};
use surveyor_markers::{AnchorId, AnchorLookup, MarkerEvent, MarkerField, MarkerRecord, PositionIndex};
use surveyor_zone::ZonePlan;

use crate::config::SurveyorConfig;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Scenario {
    #[serde(default, rename = "step")] pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    // Markers
    Place { name: String, pos: [i32; 3], #[serde(default)] powered: Option<bool> },
    Remove { name: String },
    Probe { name: String, axis: Axis, #[serde(default)] range: Option<i32> },
    Connect { name: String },
    Power { name: String, on: bool },
    /// Saves every origin, rebuilds the field from scratch and restores the groups.
    Reload,

    // Zone
    Paint { from: [i32; 2], to: [i32; 2], #[serde(default = "default_paint")] value: bool },
    Distance { x: i32, z: i32 },
}
fn default_paint() -> bool { true }

/// Largest rectangle a single paint step may cover, in columns.
pub const MAX_PAINT_COLUMNS: u64 = 1 << 24;

fn paint_columns(from: [i32; 2], to: [i32; 2]) -> u64 {
    let span = |a: i32, b: i32| (i64::from(a) - i64::from(b)).unsigned_abs() + 1;
    span(from[0], to[0]).saturating_mul(span(from[1], to[1]))
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("parse error: {}", e))
    }
}

pub fn load_scenario_from_path(path: &std::path::Path) -> Result<Scenario, String> {
    let s = std::fs::read_to_string(path).map_err(|e| format!("read error: {}", e))?;
    Scenario::from_toml_str(&s)
}

/// Host state for a scenario: the marker field, its position index, and one zone plan.
pub struct Survey {
    field: MarkerField,
    index: PositionIndex,
    names: HashMap<String, AnchorId>,
    order: Vec<String>,
    zone: ZonePlan,
    rng: StdRng,
    journal: Rc<RefCell<Vec<MarkerEvent>>>,
    powered_on_place: bool,
}

impl Survey {
    pub fn new(config: &SurveyorConfig) -> Self {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut zone = ZonePlan::new();
        zone.set_listener(|x, z| log::trace!(target: "zone", "column ({}, {}) changed", x, z));
        Self {
            field: Self::fresh_field(config.markers.range, &journal),
            index: PositionIndex::new(),
            names: HashMap::new(),
            order: Vec::new(),
            zone,
            rng: StdRng::seed_from_u64(config.zone.seed),
            journal,
            powered_on_place: config.markers.powered_on_place,
        }
    }

    fn fresh_field(range: i32, journal: &Rc<RefCell<Vec<MarkerEvent>>>) -> MarkerField {
        let mut field = MarkerField::new(range);
        let sink = Rc::clone(journal);
        field.set_listener(move |e| sink.borrow_mut().push(e.clone()));
        field
    }

    #[inline]
    pub fn field(&self) -> &MarkerField {
        &self.field
    }

    #[inline]
    pub fn zone(&self) -> &ZonePlan {
        &self.zone
    }

    pub fn anchor(&self, name: &str) -> Option<AnchorId> {
        self.names.get(name).copied()
    }

    /// Marker events emitted since the last call.
    pub fn drain_events(&self) -> Vec<MarkerEvent> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<(), String> {
        for (i, step) in scenario.steps.iter().enumerate() {
            self.apply(step).map_err(|e| format!("step {}: {}", i + 1, e))?;
            for event in self.drain_events() {
                log::info!(target: "markers", "{}", event);
            }
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<AnchorId, String> {
        self.anchor(name).ok_or_else(|| format!("unknown marker '{}'", name))
    }

    pub fn apply(&mut self, step: &Step) -> Result<(), String> {
        match step {
            Step::Place { name, pos, powered } => {
                if self.names.contains_key(name) {
                    return Err(format!("marker '{}' already placed", name));
                }
                let pos = BlockPos::new(pos[0], pos[1], pos[2]);
                self.place(name, pos, powered.unwrap_or(self.powered_on_place))?;
            }
            Step::Remove { name } => {
                let id = self.resolve(name)?;
                if let Some(pos) = self.field.remove_anchor(id) {
                    self.index.remove(pos);
                }
                self.names.remove(name);
                self.order.retain(|n| n != name);
            }
            Step::Probe { name, axis, range } => {
                let id = self.resolve(name)?;
                let range = range.unwrap_or(self.field.range());
                if range <= 0 {
                    return Err(format!("probe range must be positive, got {}", range));
                }
                let linked = self.field.probe(id, *axis, range, &self.index);
                log::info!(target: "survey", "probe {} {:?} within {}: {}", name, axis, range, if linked { "linked" } else { "nothing" });
            }
            Step::Connect { name } => {
                let id = self.resolve(name)?;
                let linked = self.field.try_connection(id, &self.index);
                log::info!(target: "survey", "connect {}: {}", name, if linked { "linked" } else { "nothing" });
            }
            Step::Power { name, on } => {
                let id = self.resolve(name)?;
                self.field.set_powered(id, *on);
            }
            Step::Reload => self.reload()?,
            Step::Paint { from, to, value } => {
                let columns = paint_columns(*from, *to);
                if columns > MAX_PAINT_COLUMNS {
                    return Err(format!(
                        "paint ({}, {})..({}, {}) covers {} columns, limit is {}",
                        from[0], from[1], to[0], to[1], columns, MAX_PAINT_COLUMNS
                    ));
                }
                self.zone.fill_rect(from[0], from[1], to[0], to[1], *value);
                log::info!(
                    target: "survey",
                    "paint ({}, {})..({}, {}) = {}: area {} in {} chunk(s)",
                    from[0], from[1], to[0], to[1], value, self.zone.area(), self.zone.len()
                );
            }
            Step::Distance { x, z } => {
                let d = self.zone.distance(*x, *z);
                log::info!(target: "survey", "zone distance from ({}, {}): {:.2}", x, z, d);
            }
        }
        Ok(())
    }

    fn place(&mut self, name: &str, pos: BlockPos, powered: bool) -> Result<AnchorId, String> {
        if let Some(other) = self.index.anchor_at(pos) {
            return Err(format!(
                "({}, {}, {}) already holds anchor {}",
                pos.x, pos.y, pos.z, other.0
            ));
        }
        let id = self.field.add_anchor(pos);
        self.index.insert(pos, id);
        self.names.insert(name.to_string(), id);
        self.order.push(name.to_string());
        if powered {
            self.field.set_powered(id, true);
        }
        Ok(id)
    }

    fn reload(&mut self) -> Result<(), String> {
        let mut saved = Vec::new();
        let mut placed = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let id = self.resolve(name)?;
            let Some(anchor) = self.field.anchor(id) else {
                continue;
            };
            placed.push((name.clone(), anchor.pos, anchor.powered));
            if let Some(record) = self.field.to_record(id) {
                let text = toml::to_string(&record).map_err(|e| format!("save error: {}", e))?;
                saved.push((name.clone(), text));
            }
        }

        self.field = Self::fresh_field(self.field.range(), &self.journal);
        self.index = PositionIndex::new();
        self.names.clear();
        self.order.clear();
        for (name, pos, powered) in placed {
            self.place(&name, pos, powered)?;
        }
        let mut restored = 0;
        for (name, text) in saved {
            let record: MarkerRecord = toml::from_str(&text).map_err(|e| format!("load error: {}", e))?;
            let id = self.resolve(&name)?;
            restored += self.field.restore(id, &record, &self.index);
        }
        log::info!(target: "survey", "reloaded {} marker(s), {} link(s) restored", self.order.len(), restored);
        Ok(())
    }

    /// Draws `n` set zone columns with the configured seed.
    pub fn sample(&mut self, n: usize) -> Vec<(i32, i32)> {
        (0..n).filter_map(|_| self.zone.random_set_position(&mut self.rng)).collect()
    }

    /// One line per marker in placement order, then a zone summary.
    pub fn report(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.order.len() + 1);
        for name in &self.order {
            let Some(id) = self.anchor(name) else {
                continue;
            };
            let Some(anchor) = self.field.anchor(id) else {
                continue;
            };
            let p = anchor.pos;
            let mut line = format!("{} ({}, {}, {})", name, p.x, p.y, p.z);
            if let Some(group) = self.field.group_of(id) {
                let b = group.bounds();
                let role = if group.origin().id == id { "origin" } else { "member" };
                line.push_str(&format!(
                    " {} of box ({}, {}, {})..({}, {}, {})",
                    role, b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
                ));
            } else {
                line.push_str(" unlinked");
            }
            if anchor.powered {
                line.push_str(&format!(", {} signal(s)", self.field.signals(id).len()));
            }
            lines.push(line);
        }
        lines.push(format!(
            "zone: {} column(s) in {} chunk(s)",
            self.zone.area(),
            self.zone.len()
        ));
        lines
    }
}
