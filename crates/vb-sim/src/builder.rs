//! Fluent builder for constructing a [`Sim`].

use vb_behavior::{Behavior, NoSinkVehicle, RsuBehavior, RsuConfig, SinkVehicle, VehicleConfig};
use vb_core::{NodeId, NodeRng, NodeType, Vector2D};

use crate::{Motion, Sim, SimConfig, SimError, SimNode, SimResult};

struct PendingNode {
    node_type: NodeType,
    motion:    Motion,
    behavior:  Box<dyn Behavior>,
}

/// Fluent builder for [`Sim`].
///
/// Node ids are assigned in insertion order starting at 0; use
/// [`next_id`][Self::next_id] to learn the id the next node will get.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default())
///     .rsu(Vector2D::ZERO, RsuConfig::with_directions(dirs))?
///     .sink_vehicle(Motion::Linear { origin, velocity, depart: SimTime::ZERO }, VehicleConfig::default())?
///     .build()?;
/// sim.run(&mut telemetry, &mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
    nodes:  Vec<PendingNode>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, nodes: Vec::new() }
    }

    /// Id the next added node will receive.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32)
    }

    /// Add a node with an arbitrary behavior.
    pub fn node(mut self, node_type: NodeType, motion: Motion, behavior: Box<dyn Behavior>) -> Self {
        self.nodes.push(PendingNode { node_type, motion, behavior });
        self
    }

    /// Add a stationary RSU.
    pub fn rsu(self, position: Vector2D, config: RsuConfig) -> SimResult<Self> {
        let behavior = RsuBehavior::new(config)?;
        Ok(self.node(NodeType::Rsu, Motion::Fixed(position), Box::new(behavior)))
    }

    /// Add a vehicle running the threshold-muting variant.
    pub fn sink_vehicle(self, motion: Motion, config: VehicleConfig) -> SimResult<Self> {
        let behavior = SinkVehicle::new(config)?;
        Ok(self.node(NodeType::VehicleFull, motion, Box::new(behavior)))
    }

    /// Add a vehicle running the explicit no-longer-conformant variant.
    pub fn no_sink_vehicle(self, motion: Motion, config: VehicleConfig) -> SimResult<Self> {
        let behavior = NoSinkVehicle::new(config)?;
        Ok(self.node(NodeType::VehicleFull, motion, Box::new(behavior)))
    }

    /// Validate the configuration and assemble the [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        if self.nodes.is_empty() {
            return Err(SimError::Config("a simulation needs at least one node".into()));
        }
        if self.nodes.len() >= NodeId::ALL.index() {
            return Err(SimError::Config(format!("too many nodes: {}", self.nodes.len())));
        }

        let seed = self.config.seed;
        let nodes = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let id = NodeId(i as u32);
                SimNode {
                    id,
                    node_type: p.node_type,
                    motion:    p.motion,
                    behavior:  p.behavior,
                    rng:       NodeRng::new(seed, id),
                }
            })
            .collect();

        Ok(Sim::new(self.config, nodes))
    }
}
