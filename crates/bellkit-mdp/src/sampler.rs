use bellkit_core::{Episode, Step};
use rand::distributions::{Distribution, Standard};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::{CompiledMdp, CompiledPolicy, MdpError};

/// Source of uniform random draws consumed by the sampler.
pub trait UniformSource {
    /// Draw a value in `[0, 1)`.
    fn draw_uniform(&mut self) -> f64;

    /// Draw an integer in `[0, n)`. `n` must be non-zero.
    fn draw_uniform_int(&mut self, n: usize) -> usize;
}

impl<R: RngCore> UniformSource for R {
    fn draw_uniform(&mut self) -> f64 {
        Standard.sample(self)
    }

    fn draw_uniform_int(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

/// Deterministic generator used for reproducible sampling runs.
pub type SeededSource = ChaCha8Rng;

/// Create a uniform source from a fixed seed.
pub fn seeded_source(seed: u64) -> SeededSource {
    ChaCha8Rng::seed_from_u64(seed)
}

#[derive(Debug, Clone, Copy)]
/// Draws episodes from an MDP while following a stochastic policy.
pub struct TrajectorySampler<'a> {
    mdp: &'a CompiledMdp,
    policy: &'a CompiledPolicy,
}

impl<'a> TrajectorySampler<'a> {
    /// Pair an MDP with a policy compiled against it.
    pub fn new(mdp: &'a CompiledMdp, policy: &'a CompiledPolicy) -> Result<Self, MdpError> {
        if policy.state_count() != mdp.state_count() {
            return Err(MdpError::PolicyMismatch {
                policy_states: policy.state_count(),
                mdp_states: mdp.state_count(),
            });
        }
        if mdp.start_candidates().is_empty() {
            return Err(MdpError::NoStartCandidates);
        }
        Ok(TrajectorySampler { mdp, policy })
    }

    /// Sample one episode.
    ///
    /// The start state is drawn uniformly from the non-terminal states. Each step then
    /// consumes one draw to pick an action and one to pick the successor. Sampling stops
    /// on entering a terminal state, once the step counter has passed `max_steps`
    /// (so at most `max_steps + 1` steps are taken), or when the current state offers
    /// no action or successor with probability mass.
    pub fn sample_episode<U>(&self, source: &mut U, max_steps: usize) -> Episode
    where
        U: UniformSource + ?Sized,
    {
        let candidates = self.mdp.start_candidates();
        let mut state = candidates[source.draw_uniform_int(candidates.len())];
        let mut episode = Episode::default();
        let mut steps = 0;

        loop {
            if self.mdp.is_terminal(state).unwrap_or(false) {
                episode.set_terminated(true);
                break;
            }
            if steps > max_steps {
                break;
            }
            steps += 1;

            let Some(action) = self.policy.sample_action(state, source.draw_uniform()) else {
                trace!(state = state.index(), "no action with probability mass");
                break;
            };
            let reward = self.mdp.reward(state, action);
            let Some(next) = self.mdp.sample_next(state, action, source.draw_uniform()) else {
                trace!(
                    state = state.index(),
                    action = action.index(),
                    "no successor with probability mass"
                );
                break;
            };

            episode.push(Step::new(state, action, reward, next));
            state = next;
        }

        episode
    }

    /// Sample `count` episodes in sequence from the same source.
    pub fn sample<U>(&self, source: &mut U, max_steps: usize, count: usize) -> Vec<Episode>
    where
        U: UniformSource + ?Sized,
    {
        let episodes: Vec<Episode> = (0..count)
            .map(|_| self.sample_episode(source, max_steps))
            .collect();

        debug!(
            policy = self.policy.name().unwrap_or("unnamed"),
            episodes = episodes.len(),
            terminated = episodes.iter().filter(|e| e.terminated()).count(),
            steps = episodes.iter().map(Episode::len).sum::<usize>(),
            max_steps,
            "sampled episodes"
        );
        episodes
    }
}

/// Render an episode as `(state, action, reward, next_state)` tuples using model ids.
pub fn describe_episode(mdp: &CompiledMdp, episode: &Episode) -> String {
    let steps: Vec<String> = episode
        .steps()
        .iter()
        .map(|step| {
            format!(
                "({}, {}, {}, {})",
                mdp.state_id(step.state).unwrap_or("?"),
                mdp.action_id(step.state, step.action).unwrap_or("?"),
                step.reward,
                mdp.state_id(step.next_state).unwrap_or("?"),
            )
        })
        .collect();
    format!("[{}]", steps.join(", "))
}
