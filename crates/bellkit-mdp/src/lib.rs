mod builder;
mod compiled;
pub mod demo;
mod error;
mod io;
mod policy;
mod sampler;
mod spec;

pub use builder::{MdpBuilder, PolicyBuilder};
pub use compiled::CompiledMdp;
pub use error::MdpError;
pub use io::{compile_yaml, load_policy_yaml, load_yaml, save_policy_yaml, save_yaml};
pub use policy::CompiledPolicy;
pub use sampler::{SeededSource, TrajectorySampler, UniformSource, describe_episode, seeded_source};
pub use spec::{ActionSpec, MdpSpec, OutcomeSpec, PolicyEntrySpec, PolicySpec, StateSpec};
