//! The demonstration mechanism driven by the REPL.
//!
//! A planar arm with two revolute joints and a prismatic wrist, plus a
//! free-standing camera rig whose pose is read entirely from the state
//! vector:
//!
//! ```text
//! base ─ shoulder(rz, x0) ─ upper_arm ─ elbow(rz, x1) ─ forearm ─ wrist(tx, x2) ─ tool
//! camera_mount ─ camera   (translation x3..x5, quaternion x6..x9)
//! ```

use kinematic_geometry::{Design, Dtdr, Ftfr, Joint, JointType, Link};
use kinematic_model::{GeometryPlugin, StateEstimator};
use kinematic_types::BoxError;
use nalgebra::DVector;

/// State vector length required by [`DemoArm`].
pub const DEMO_STATE_VARIABLES: usize = 10;

const SHOULDER: usize = 0;
const ELBOW: usize = 1;
const WRIST: usize = 2;
const JOINTS: [usize; 3] = [SHOULDER, ELBOW, WRIST];

const CAMERA_TRANSLATION: [usize; 3] = [3, 4, 5];
const CAMERA_ROTATION: [usize; 4] = [6, 7, 8, 9];

/// Link lengths in metres.
const SHOULDER_HEIGHT: f64 = 0.1;
const UPPER_ARM_LENGTH: f64 = 0.4;
const FOREARM_LENGTH: f64 = 0.3;

/// Geometry plugin for the demo arm and camera rig.
pub struct DemoArm;

impl GeometryPlugin for DemoArm {
    fn build_geometry(&self, design: &mut Design) -> Result<(), BoxError> {
        let base = design.add_root(Link::new("base"))?;

        let shoulder = design.add_child(
            Joint::new("shoulder", JointType::Revolute, SHOULDER),
            base,
            Ftfr::translation(0.0, 0.0, SHOULDER_HEIGHT),
        )?;
        let through_shoulder = design.joint_attachment(shoulder)?;
        let upper_arm = design.add_child(Link::new("upper_arm"), shoulder, through_shoulder)?;

        let elbow = design.add_child(
            Joint::new("elbow", JointType::Revolute, ELBOW),
            upper_arm,
            Ftfr::translation(UPPER_ARM_LENGTH, 0.0, 0.0),
        )?;
        let through_elbow = design.joint_attachment(elbow)?;
        let forearm = design.add_child(Link::new("forearm"), elbow, through_elbow)?;

        let wrist = design.add_child(
            Joint::new("wrist", JointType::Prismatic, WRIST).with_axis(1.0, 0.0, 0.0)?,
            forearm,
            Ftfr::translation(FOREARM_LENGTH, 0.0, 0.0),
        )?;
        let through_wrist = design.joint_attachment(wrist)?;
        design.add_child(Link::new("tool"), wrist, through_wrist)?;

        let mount = design.add_root(Link::new("camera_mount"))?;
        design.add_child(
            Link::new("camera"),
            mount,
            Dtdr::new(CAMERA_TRANSLATION, CAMERA_ROTATION),
        )?;
        Ok(())
    }
}

/// Stand-in estimator: every cycle advances each joint coordinate by a fixed
/// increment and leaves the camera rig where it is.
#[derive(Debug, Clone)]
pub struct ScriptedEstimator {
    state: DVector<f64>,
    step: f64,
    cycles: u64,
}

impl ScriptedEstimator {
    pub fn new(step: f64) -> Self {
        let mut state = DVector::zeros(DEMO_STATE_VARIABLES);
        state[CAMERA_TRANSLATION[0]] = 0.5;
        state[CAMERA_TRANSLATION[2]] = 1.0;
        // Deliberately not unit length; the attachment normalises it.
        state[CAMERA_ROTATION[0]] = 2.0;
        Self {
            state,
            step,
            cycles: 0,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl StateEstimator for ScriptedEstimator {
    fn iterate(&mut self) -> Result<(), BoxError> {
        if !self.step.is_finite() {
            return Err(format!("step size {} is not finite", self.step).into());
        }
        for index in JOINTS {
            self.state[index] += self.step;
        }
        self.cycles += 1;
        Ok(())
    }

    fn state_vector(&self) -> &DVector<f64> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinematic_model::{KinematicModel, ModelDimensions};
    use kinematic_types::KinematicsError;
    use nalgebra::Vector3;

    fn demo_model(step: f64) -> KinematicModel<ScriptedEstimator, DemoArm> {
        let dimensions = ModelDimensions {
            n_state_variables: DEMO_STATE_VARIABLES,
            n_sensors: 3,
        };
        let mut model = KinematicModel::new(dimensions, ScriptedEstimator::new(step), DemoArm);
        model.initialize().expect("demo geometry is valid");
        model
    }

    #[test]
    fn demo_design_has_all_frames() {
        let model = demo_model(0.05);
        let graph = model.graph().unwrap();
        for name in [
            "base", "shoulder", "upper_arm", "elbow", "forearm", "wrist", "tool",
            "camera_mount", "camera",
        ] {
            assert!(graph.contains(name), "missing {name}");
        }
        assert_eq!(graph.parent_of("tool"), Some("wrist"));
        assert_eq!(graph.parent_of("camera_mount"), None);
    }

    #[test]
    fn arm_is_stretched_along_x_at_zero_state() {
        let mut model = demo_model(0.05);
        let t = model.get_transform("base", "tool").unwrap();
        let expected = Vector3::new(UPPER_ARM_LENGTH + FOREARM_LENGTH, 0.0, SHOULDER_HEIGHT);
        assert!((t.translation - expected).norm() < 1e-9);
    }

    #[test]
    fn stepping_advances_joints_only() {
        let mut estimator = ScriptedEstimator::new(0.1);
        estimator.iterate().unwrap();
        estimator.iterate().unwrap();
        let state = estimator.state_vector();
        assert!((state[SHOULDER] - 0.2).abs() < 1e-12);
        assert!((state[WRIST] - 0.2).abs() < 1e-12);
        assert_eq!(state[CAMERA_ROTATION[0]], 2.0);
        assert_eq!(estimator.cycles(), 2);
    }

    #[test]
    fn camera_rig_is_disconnected_from_arm() {
        let mut model = demo_model(0.05);
        assert!(model.get_transform("base", "camera").is_none());

        let t = model.get_transform("camera_mount", "camera").unwrap();
        assert!((t.translation - Vector3::new(0.5, 0.0, 1.0)).norm() < 1e-12);
        assert!(t.rotation.angle() < 1e-9);
    }

    #[test]
    fn configured_state_size_must_match_demo() {
        let dimensions = ModelDimensions {
            n_state_variables: DEMO_STATE_VARIABLES + 2,
            n_sensors: 3,
        };
        let mut model = KinematicModel::new(dimensions, ScriptedEstimator::new(0.05), DemoArm);
        let err = model.initialize().unwrap_err();
        assert!(matches!(
            err,
            KinematicsError::DimensionMismatch {
                expected: 12,
                actual: DEMO_STATE_VARIABLES
            }
        ));
        assert!(!model.is_initialized());
    }

    #[test]
    fn non_finite_step_reports_estimation_failure() {
        let mut model = demo_model(f64::NAN);
        assert!(model.iterate().is_err());
    }
}
