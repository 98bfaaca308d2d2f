pub mod assembly;
pub mod error;
pub mod joint;
pub mod kernel;
pub mod math;

pub use assembly::{
    join_pair, synthesize_assembly, AssemblyReport, PairJoin, PairwiseJointSynthesizer, WorkingSet,
};
pub use error::{JoineryError, JointFailure, Result};
pub use joint::{generate_joint, Joint, JointKind, JointOutcome, JointParameters};
