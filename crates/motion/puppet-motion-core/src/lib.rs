//! Puppet Motion Core (engine-agnostic)
//!
//! Evaluates keyframed motion curves and plays them on a parameter-driven
//! model. Clips are validated once into an immutable [`MotionClip`]; a
//! [`MotionManager`] queues them with fade-in/fade-out cross-fades and
//! priority admission, and writes the blended values through the [`Model`]
//! trait every tick. Eye-blink and lip-sync curves are merged into the
//! configured effect parameters.

pub mod config;
pub mod data;
pub mod effects;
pub mod error;
pub mod expression;
pub mod fsm;
pub mod ids;
pub mod interp;
pub mod manager;
pub mod model;
pub mod outputs;
pub mod queue;
pub mod raw;
pub mod sampling;

// Re-exports for hosts
pub use config::{Config, MotionBehavior, MotionConfig};
pub use data::{
    Curve, CurveTarget, ModelEffect, MotionClip, MotionPoint, Segment, SegmentKind, UserEvent,
};
pub use error::{MotionError, TransitionError};
pub use expression::{ExpressionBlend, ExpressionMotion, ExpressionParameter};
pub use fsm::EntryState;
pub use ids::{EntryId, ParamId};
pub use interp::{BezierEvaluation, CurveEvaluator};
pub use manager::{MotionManager, MotionQueueManager, Priority};
pub use model::{Model, ParameterTable};
pub use outputs::{MotionEvent, Outputs};
pub use queue::{ClipMotion, Motion, MotionQueueEntry};
pub use raw::{RawClip, RawCurve, RawSegment};
pub use sampling::evaluate_curve;
