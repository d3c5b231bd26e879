//! Frame graph and path solver.
//!
//! A [`Graph`] is built once from a finished [`Design`].  Frames become nodes;
//! every non-root instruction becomes an edge from parent to child labelled
//! with its [`Attachment`].  Because each frame has at most one parent the
//! graph is a forest, so two frames in the same tree are joined by exactly one
//! path and frames in different trees by none.
//!
//! [`Graph::solve_path`] runs a breadth-first search over the undirected view
//! of the edges and records, for each edge crossed, whether it was walked
//! parent→child ([`Direction::ParentChild`]) or against its stored direction
//! ([`Direction::ChildParent`]).  Solved paths depend only on structure, so
//! they are cached for the lifetime of the graph under the unordered pair of
//! frames and reversed on demand.
//!
//! # Example
//!
//! ```rust
//! use kinematic_geometry::attachment::Ftfr;
//! use kinematic_geometry::design::Design;
//! use kinematic_geometry::graph::Graph;
//! use kinematic_geometry::object::Link;
//! use nalgebra::DVector;
//!
//! let mut design = Design::new();
//! let world = design.add_root(Link::new("world")).unwrap();
//! design.add_child(Link::new("robot_base"), world, Ftfr::translation(1.0, 0.0, 0.0)).unwrap();
//!
//! let mut graph = Graph::build(&design).unwrap();
//! let path = graph.solve_path("robot_base", "world").unwrap();
//! let t = path.resolve(&DVector::zeros(0));
//! assert!((t.translation.x + 1.0).abs() < 1e-12);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use kinematic_types::{GraphBuildViolation, KinematicsError};
use nalgebra::DVector;
use tracing::{debug, info, instrument};

use crate::attachment::Attachment;
use crate::design::Design;
use crate::object::{Frame, FrameId};
use crate::transform::Transform;

// ────────────────────────────────────────────────────────────────────────────
// Path
// ────────────────────────────────────────────────────────────────────────────

/// Direction in which a path crosses an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Along the attachment's native parent→child direction.
    ParentChild,
    /// Against it; the attachment transform must be inverted.
    ChildParent,
}

impl Direction {
    fn reversed(self) -> Self {
        match self {
            Direction::ParentChild => Direction::ChildParent,
            Direction::ChildParent => Direction::ParentChild,
        }
    }
}

/// One edge crossing of a [`Path`].
#[derive(Debug, Clone)]
pub struct Step {
    pub attachment: Arc<Attachment>,
    pub direction: Direction,
}

impl Step {
    /// Transform contributed by this step at the given state.
    pub fn get_transform(&self, state_vector: &DVector<f64>) -> Transform {
        let transform = self.attachment.get_transform(state_vector);
        match self.direction {
            Direction::ParentChild => transform,
            Direction::ChildParent => transform.inverse(),
        }
    }
}

/// Ordered edge crossings from a source frame to a target frame.
///
/// An empty path joins a frame to itself.
#[derive(Debug, Clone, Default)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The same path walked target→source.
    pub fn reversed(&self) -> Self {
        Self {
            steps: self
                .steps
                .iter()
                .rev()
                .map(|step| Step {
                    attachment: Arc::clone(&step.attachment),
                    direction: step.direction.reversed(),
                })
                .collect(),
        }
    }

    /// Compose every step, in source→target order, into the transform from
    /// the source frame to the target frame.
    pub fn resolve(&self, state_vector: &DVector<f64>) -> Transform {
        self.steps
            .iter()
            .fold(Transform::identity(), |acc, step| {
                acc.apply(step.get_transform(state_vector))
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Graph
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Edge {
    parent: usize,
    child: usize,
    attachment: Arc<Attachment>,
}

/// Immutable forest of frames and attachment edges with a path cache.
#[derive(Debug)]
pub struct Graph {
    frames: Vec<Frame>,
    nodes: HashMap<String, usize>,
    edges: Vec<Edge>,
    /// Edge indices incident to each node.
    adjacency: Vec<Vec<usize>>,
    /// Keyed by `(min, max)` node index; paths stored min→max.
    path_cache: HashMap<(usize, usize), Path>,
}

impl Graph {
    /// Build the graph from a design's instructions.
    ///
    /// # Errors
    ///
    /// [`KinematicsError::GraphBuild`] on a duplicate frame name or an
    /// instruction whose parent was not inserted before it.
    #[instrument(skip_all, fields(instructions = design.len()))]
    pub fn build(design: &Design) -> Result<Self, KinematicsError> {
        let mut graph = Self {
            frames: Vec::with_capacity(design.len()),
            nodes: HashMap::with_capacity(design.len()),
            edges: Vec::new(),
            adjacency: Vec::with_capacity(design.len()),
            path_cache: HashMap::new(),
        };
        let mut inserted: HashMap<FrameId, usize> = HashMap::with_capacity(design.len());

        for instruction in design.instructions() {
            let frame = instruction.frame();
            if graph.nodes.contains_key(frame.name()) {
                return Err(KinematicsError::GraphBuild(
                    GraphBuildViolation::DuplicateName(frame.name().to_string()),
                ));
            }

            let node = graph.frames.len();
            if let (Some(parent), Some(attachment)) = (instruction.parent(), instruction.attachment()) {
                let parent_node = *inserted.get(&parent).ok_or_else(|| {
                    KinematicsError::GraphBuild(GraphBuildViolation::OrphanedParent {
                        frame: frame.name().to_string(),
                    })
                })?;
                let edge = graph.edges.len();
                graph.edges.push(Edge {
                    parent: parent_node,
                    child: node,
                    attachment: Arc::new(attachment.clone()),
                });
                graph.adjacency[parent_node].push(edge);
                graph.adjacency.push(vec![edge]);
            } else {
                graph.adjacency.push(Vec::new());
            }

            graph.nodes.insert(frame.name().to_string(), node);
            graph.frames.push(frame.clone());
            inserted.insert(instruction.id(), node);
        }

        info!(
            frames = graph.frames.len(),
            edges = graph.edges.len(),
            roots = graph.frames.len() - graph.edges.len(),
            "frame graph built"
        );
        Ok(graph)
    }

    /// Solve the path from `source` to `target`.
    ///
    /// Returns `None` when either name is unknown or the frames lie in
    /// different trees.
    pub fn solve_path(&mut self, source: &str, target: &str) -> Option<Path> {
        let from = *self.nodes.get(source)?;
        let to = *self.nodes.get(target)?;
        let key = (from.min(to), from.max(to));

        if !self.path_cache.contains_key(&key) {
            let path = self.search(key.0, key.1)?;
            debug!(source, target, steps = path.len(), "path solved");
            self.path_cache.insert(key, path);
        }

        let canonical = &self.path_cache[&key];
        if from == key.0 {
            Some(canonical.clone())
        } else {
            Some(canonical.reversed())
        }
    }

    /// Breadth-first search over the undirected view of the edges.
    fn search(&self, source: usize, target: usize) -> Option<Path> {
        let mut came_from: Vec<Option<(usize, Direction)>> = vec![None; self.frames.len()];
        let mut visited = vec![false; self.frames.len()];
        let mut queue = VecDeque::new();

        visited[source] = true;
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            if node == target {
                break;
            }
            for &edge_index in &self.adjacency[node] {
                let edge = &self.edges[edge_index];
                let (next, direction) = if edge.parent == node {
                    (edge.child, Direction::ParentChild)
                } else {
                    (edge.parent, Direction::ChildParent)
                };
                if visited[next] {
                    continue;
                }
                visited[next] = true;
                came_from[next] = Some((edge_index, direction));
                queue.push_back(next);
            }
        }

        if !visited[target] {
            return None;
        }

        let mut steps = Vec::new();
        let mut node = target;
        while node != source {
            let (edge_index, direction) = came_from[node]?;
            let edge = &self.edges[edge_index];
            steps.push(Step {
                attachment: Arc::clone(&edge.attachment),
                direction,
            });
            node = match direction {
                Direction::ParentChild => edge.parent,
                Direction::ChildParent => edge.child,
            };
        }
        steps.reverse();
        Some(Path { steps })
    }

    /// True when a frame named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.nodes.get(name).map(|&node| &self.frames[node])
    }

    /// Frame names in design order.
    pub fn frame_names(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(Frame::name)
    }

    /// Parent of the named frame, or `None` for roots and unknown names.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        let node = *self.nodes.get(name)?;
        self.edges
            .iter()
            .find(|edge| edge.child == node)
            .map(|edge| self.frames[edge.parent].name())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frame pairs with a cached path.
    pub fn cached_paths(&self) -> usize {
        self.path_cache.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{Dtfr, Ftfr};
    use crate::object::{Joint, JointType, Link};
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn step_x() -> Ftfr {
        Ftfr::translation(1.0, 0.0, 0.0)
    }

    /// root → a → b → c, each 1 m along X.
    fn chain() -> Graph {
        let mut design = Design::new();
        let root = design.add_root(Link::new("root")).unwrap();
        let a = design.add_child(Link::new("a"), root, step_x()).unwrap();
        let b = design.add_child(Link::new("b"), a, step_x()).unwrap();
        design.add_child(Link::new("c"), b, step_x()).unwrap();
        Graph::build(&design).unwrap()
    }

    #[test]
    fn chain_path_has_three_down_steps() {
        let mut graph = chain();
        let path = graph.solve_path("root", "c").unwrap();
        assert_eq!(path.len(), 3);
        assert!(path.steps().iter().all(|s| s.direction == Direction::ParentChild));

        let t = path.resolve(&DVector::zeros(0));
        assert!((t.translation - Vector3::new(3.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn upward_path_inverts_steps() {
        let mut graph = chain();
        let path = graph.solve_path("c", "a").unwrap();
        assert_eq!(path.len(), 2);
        assert!(path.steps().iter().all(|s| s.direction == Direction::ChildParent));

        let t = path.resolve(&DVector::zeros(0));
        assert!((t.translation.x + 2.0).abs() < EPS);
    }

    #[test]
    fn reverse_query_reuses_cached_path() {
        let mut graph = chain();
        let forward = graph.solve_path("a", "c").unwrap();
        assert_eq!(graph.cached_paths(), 1);

        let backward = graph.solve_path("c", "a").unwrap();
        assert_eq!(graph.cached_paths(), 1);
        assert_eq!(backward.len(), forward.len());

        let state = DVector::zeros(0);
        let round_trip = forward.resolve(&state).apply(backward.resolve(&state));
        assert!(round_trip.translation.norm() < EPS);
    }

    #[test]
    fn branch_path_goes_up_then_down() {
        let mut design = Design::new();
        let base = design.add_root(Link::new("base")).unwrap();
        design
            .add_child(Link::new("left"), base, Ftfr::translation(0.0, 1.0, 0.0))
            .unwrap();
        design
            .add_child(Link::new("right"), base, Ftfr::translation(0.0, -1.0, 0.0))
            .unwrap();
        let mut graph = Graph::build(&design).unwrap();

        let path = graph.solve_path("left", "right").unwrap();
        let directions: Vec<Direction> = path.steps().iter().map(|s| s.direction).collect();
        assert_eq!(directions, [Direction::ChildParent, Direction::ParentChild]);

        let t = path.resolve(&DVector::zeros(0));
        assert!((t.translation.y + 2.0).abs() < EPS);
    }

    #[test]
    fn path_respects_rotation_in_chain() {
        // base is rotated 90° about Z by a revolute joint; the tool sits 1 m
        // along the joint's local +X, which lands on base +Y.
        let mut design = Design::new();
        let base = design.add_root(Link::new("base")).unwrap();
        let joint = design
            .add_child(Joint::new("yaw", JointType::Revolute, 0), base, Ftfr::translation(0.0, 0.0, 0.0))
            .unwrap();
        let through_joint = design.joint_attachment(joint).unwrap();
        let link = design.add_child(Link::new("link"), joint, through_joint).unwrap();
        design.add_child(Link::new("tool"), link, step_x()).unwrap();
        let mut graph = Graph::build(&design).unwrap();

        let state = DVector::from_vec(vec![FRAC_PI_2]);
        let t = graph.solve_path("base", "tool").unwrap().resolve(&state);
        assert!(t.translation.x.abs() < EPS, "x={}", t.translation.x);
        assert!((t.translation.y - 1.0).abs() < EPS, "y={}", t.translation.y);
    }

    #[test]
    fn joint_edge_follows_committed_axis_not_retained_draft() {
        let mut design = Design::new();
        let base = design.add_root(Link::new("base")).unwrap();
        let mut draft = Joint::new("slide", JointType::Prismatic, 0);
        let slide = design
            .add_child(draft.clone(), base, Ftfr::translation(0.0, 0.0, 0.0))
            .unwrap();

        // The retained copy is a separate value; editing it cannot reach the design.
        draft.set_axis_definition(1.0, 0.0, 0.0).unwrap();

        let through_slide = design.joint_attachment(slide).unwrap();
        design.add_child(Link::new("tool"), slide, through_slide).unwrap();
        let committed_axis = design.frame(slide).unwrap().as_joint().unwrap().axis_definition();
        let mut graph = Graph::build(&design).unwrap();

        let t = graph
            .solve_path("base", "tool")
            .unwrap()
            .resolve(&DVector::from_vec(vec![0.5]));
        assert_eq!(committed_axis, Vector3::z());
        assert!(t.translation.x.abs() < EPS, "x={}", t.translation.x);
        assert!((t.translation.z - 0.5).abs() < EPS, "z={}", t.translation.z);
    }

    #[test]
    fn dynamic_edges_follow_state() {
        let mut design = Design::new();
        let world = design.add_root(Link::new("world")).unwrap();
        design
            .add_child(Link::new("cart"), world, Dtfr::new([0, 1, 2], 1.0, 0.0, 0.0, 0.0))
            .unwrap();
        let mut graph = Graph::build(&design).unwrap();
        let path = graph.solve_path("world", "cart").unwrap();

        let first = path.resolve(&DVector::from_vec(vec![1.0, 0.0, 0.0]));
        let second = path.resolve(&DVector::from_vec(vec![2.0, 0.0, 0.0]));
        assert!((first.translation.x - 1.0).abs() < EPS);
        assert!((second.translation.x - 2.0).abs() < EPS);
    }

    #[test]
    fn disjoint_trees_have_no_path() {
        let mut design = Design::new();
        let a = design.add_root(Link::new("a_root")).unwrap();
        design.add_child(Link::new("a_leaf"), a, step_x()).unwrap();
        design.add_root(Link::new("b_root")).unwrap();
        let mut graph = Graph::build(&design).unwrap();

        assert!(graph.solve_path("a_leaf", "b_root").is_none());
        assert_eq!(graph.cached_paths(), 0);
    }

    #[test]
    fn unknown_frame_has_no_path() {
        let mut graph = chain();
        assert!(graph.solve_path("root", "ghost").is_none());
        assert!(graph.solve_path("ghost", "root").is_none());
    }

    #[test]
    fn same_frame_path_is_empty() {
        let mut graph = chain();
        let path = graph.solve_path("b", "b").unwrap();
        assert!(path.is_empty());
        assert_eq!(path.resolve(&DVector::zeros(0)), Transform::identity());
    }

    #[test]
    fn duplicate_names_fail_build() {
        let mut design = Design::new();
        let base = design.add_root(Link::new("base")).unwrap();
        design.add_child(Link::new("base"), base, step_x()).unwrap();
        let result = Graph::build(&design);
        assert!(matches!(
            result,
            Err(KinematicsError::GraphBuild(GraphBuildViolation::DuplicateName(ref name))) if name == "base"
        ));
    }

    #[test]
    fn introspection() {
        let graph = chain();
        let names: Vec<&str> = graph.frame_names().collect();
        assert_eq!(names, ["root", "a", "b", "c"]);
        assert!(graph.contains("b"));
        assert!(!graph.contains("z"));
        assert_eq!(graph.parent_of("c"), Some("b"));
        assert_eq!(graph.parent_of("root"), None);
        assert_eq!(graph.len(), 4);
    }
}
