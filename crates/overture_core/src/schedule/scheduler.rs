//! Per-phase system lists with sequential and parallel runners.
//!
//! ## Lifecycle
//!
//! 1. Systems are registered (appended or prepended) into phases. These
//!    registrations are buffered.
//! 2. [`Scheduler::arm`] flushes the buffer into the per-phase lists, splits
//!    every phase into parallel batches and builds the worker pool.
//! 3. Phases are run any number of times. Registering after arming fails.
//!
//! ## Batching
//!
//! Each system goes into the first batch of its phase whose members it does
//! not conflict with, in registration order. Systems inside a batch may run
//! concurrently; batches run one after another.

use std::fmt;

use rayon::{ThreadPool, ThreadPoolBuilder};

use super::access::Access;
use super::phase::Phase;
use super::system::System;
use crate::config::{ConflictPolicy, SchedulerConfig};
use crate::ecs::World;
use crate::error::{ScheduleError, ScheduleResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    Back,
    Front,
}

struct Registration {
    phase: Phase,
    placement: Placement,
    system: Box<dyn System>,
}

/// Armed state of one phase.
#[derive(Default)]
struct PhaseSchedule {
    /// Systems in run order.
    systems: Vec<Box<dyn System>>,
    /// Indices into `systems`, grouped into non-conflicting batches.
    batches: Vec<Vec<usize>>,
}

/// Ordered system lists for every [`Phase`].
pub struct Scheduler {
    config: SchedulerConfig,
    pending: Vec<Registration>,
    phases: Vec<PhaseSchedule>,
    pool: Option<ThreadPool>,
}

impl Scheduler {
    /// Creates an unarmed scheduler with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates an unarmed scheduler.
    #[must_use]
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            phases: Phase::ALL.iter().map(|_| PhaseSchedule::default()).collect(),
            pool: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Checks whether [`Scheduler::arm`] has completed.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pool.is_some()
    }

    /// Appends `system` to `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::AlreadyArmed`] once the scheduler is armed.
    pub fn register(&mut self, phase: Phase, system: impl System + 'static) -> ScheduleResult<()> {
        self.register_boxed(phase, Box::new(system))
    }

    /// Appends an already boxed system to `phase`.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::register`].
    pub fn register_boxed(&mut self, phase: Phase, system: Box<dyn System>) -> ScheduleResult<()> {
        self.push(phase, Placement::Back, system)
    }

    /// Prepends `system` to `phase`, ahead of everything registered so far.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::register`].
    pub fn register_front(&mut self, phase: Phase, system: impl System + 'static) -> ScheduleResult<()> {
        self.push(phase, Placement::Front, Box::new(system))
    }

    fn push(&mut self, phase: Phase, placement: Placement, system: Box<dyn System>) -> ScheduleResult<()> {
        if self.is_armed() {
            tracing::warn!(system = system.name(), %phase, "registration after arming rejected");
            return Err(ScheduleError::AlreadyArmed);
        }
        tracing::trace!(system = system.name(), %phase, ?placement, "system registered");
        self.pending.push(Registration {
            phase,
            placement,
            system,
        });
        Ok(())
    }

    /// Flushes buffered registrations, computes batches and starts the
    /// worker pool. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::AccessConflict`] under [`ConflictPolicy::Reject`]
    ///   when two systems of a parallel phase conflict
    /// - [`ScheduleError::ThreadPool`] if the workers cannot be spawned
    ///
    /// The scheduler stays unarmed on error.
    pub fn arm(&mut self) -> ScheduleResult<()> {
        if self.is_armed() {
            return Ok(());
        }

        for registration in self.pending.drain(..) {
            let systems = &mut self.phases[registration.phase.index()].systems;
            match registration.placement {
                Placement::Back => systems.push(registration.system),
                Placement::Front => systems.insert(0, registration.system),
            }
        }

        for phase in Phase::ALL {
            let schedule = &mut self.phases[phase.index()];
            schedule.batches = make_batches(phase, &schedule.systems, &self.config)?;
            if !schedule.systems.is_empty() {
                tracing::debug!(
                    %phase,
                    systems = schedule.systems.len(),
                    batches = schedule.batches.len(),
                    "phase armed"
                );
            }
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .thread_name(|i| format!("overture-worker-{i}"))
            .build()
            .map_err(|err| ScheduleError::ThreadPool(err.to_string()))?;
        tracing::info!(workers = pool.current_num_threads(), "scheduler armed");
        self.pool = Some(pool);
        Ok(())
    }

    /// Runs every system of `phase` on the calling thread, in order.
    ///
    /// Each system sees the effects of the ones before it.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotArmed`] before [`Scheduler::arm`].
    pub fn run_sequential(&self, phase: Phase, world: &World) -> ScheduleResult<()> {
        if !self.is_armed() {
            return Err(ScheduleError::NotArmed);
        }
        let _span = tracing::debug_span!("phase", %phase, mode = "sequential").entered();
        for system in &self.phases[phase.index()].systems {
            system.run(world);
        }
        Ok(())
    }

    /// Runs `phase` batch by batch, forking each batch onto the worker pool.
    ///
    /// Returns only after every system has finished. There is no order among
    /// systems of one batch. A panicking system propagates its panic to the
    /// caller once its batch has joined.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotArmed`] before [`Scheduler::arm`].
    pub fn run_parallel(&self, phase: Phase, world: &World) -> ScheduleResult<()> {
        let pool = self.pool.as_ref().ok_or(ScheduleError::NotArmed)?;
        let _span = tracing::debug_span!("phase", %phase, mode = "parallel").entered();

        let schedule = &self.phases[phase.index()];
        for batch in &schedule.batches {
            if let [single] = batch.as_slice() {
                schedule.systems[*single].run(world);
                continue;
            }
            pool.scope(|scope| {
                for &index in batch {
                    let system = &schedule.systems[index];
                    scope.spawn(move |_| system.run(world));
                }
            });
        }
        Ok(())
    }

    /// Runs `phase` with the runner its configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotArmed`] before [`Scheduler::arm`].
    pub fn run(&self, phase: Phase, world: &World) -> ScheduleResult<()> {
        if self.config.is_parallel(phase) {
            self.run_parallel(phase, world)
        } else {
            self.run_sequential(phase, world)
        }
    }

    /// Number of armed systems in `phase`.
    #[must_use]
    pub fn len(&self, phase: Phase) -> usize {
        self.phases[phase.index()].systems.len()
    }

    /// Names of the armed systems of `phase`, in run order.
    #[must_use]
    pub fn system_names(&self, phase: Phase) -> Vec<&str> {
        self.phases[phase.index()]
            .systems
            .iter()
            .map(|system| system.name())
            .collect()
    }

    /// Names of the systems in each parallel batch of `phase`.
    #[must_use]
    pub fn batches(&self, phase: Phase) -> Vec<Vec<&str>> {
        let schedule = &self.phases[phase.index()];
        schedule
            .batches
            .iter()
            .map(|batch| batch.iter().map(|&i| schedule.systems[i].name()).collect())
            .collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for phase in Phase::ALL {
            let names = self.system_names(phase);
            if !names.is_empty() {
                map.entry(&phase, &names);
            }
        }
        map.finish()
    }
}

/// Greedy first-fit partition of `systems` into non-conflicting batches.
fn make_batches(
    phase: Phase,
    systems: &[Box<dyn System>],
    config: &SchedulerConfig,
) -> ScheduleResult<Vec<Vec<usize>>> {
    let parallel = config.is_parallel(phase);
    let accesses: Vec<Access> = systems.iter().map(|system| system.access()).collect();
    let mut batches: Vec<Vec<usize>> = Vec::new();

    'next_system: for (index, access) in accesses.iter().enumerate() {
        let mut first_conflict = None;
        for batch in &mut batches {
            let conflict = batch
                .iter()
                .find_map(|&other| accesses[other].conflicts_with(access).map(|c| (other, c)));
            match conflict {
                None => {
                    batch.push(index);
                    continue 'next_system;
                }
                Some(found) => {
                    first_conflict.get_or_insert(found);
                }
            }
        }

        if let (true, Some((other, component))) = (parallel, first_conflict) {
            let first = systems[other].name();
            let second = systems[index].name();
            if config.conflict_policy == ConflictPolicy::Reject {
                tracing::error!(%phase, first, second, component, "access conflict in parallel phase");
                return Err(ScheduleError::AccessConflict {
                    phase,
                    first: first.to_owned(),
                    second: second.to_owned(),
                    component,
                });
            }
            tracing::warn!(%phase, first, second, component, "access conflict; systems split into separate batches");
        }
        batches.push(vec![index]);
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Component;
    use crate::schedule::FnSystem;
    use bytemuck::{Pod, Zeroable};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[allow(dead_code)]
    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C)]
    struct Position(i32);
    impl Component for Position {}

    #[allow(dead_code)]
    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C)]
    struct Velocity(i32);
    impl Component for Velocity {}

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> FnSystem<impl Fn(&World) + Send + Sync + 'static> {
        let log = Arc::clone(log);
        FnSystem::new(name, move |_: &World| log.lock().push(name))
    }

    #[test]
    fn test_registration_is_buffered_until_armed() {
        let mut scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        scheduler.register(Phase::Update, recorder("a", &log)).unwrap();
        assert_eq!(scheduler.len(Phase::Update), 0);

        let world = World::new();
        assert_eq!(scheduler.run_sequential(Phase::Update, &world), Err(ScheduleError::NotArmed));
        assert_eq!(scheduler.run_parallel(Phase::Update, &world), Err(ScheduleError::NotArmed));

        scheduler.arm().unwrap();
        scheduler.arm().unwrap();
        assert_eq!(scheduler.len(Phase::Update), 1);
        assert_eq!(
            scheduler.register(Phase::Update, recorder("late", &log)),
            Err(ScheduleError::AlreadyArmed)
        );
    }

    #[test]
    fn test_front_registration() {
        let mut scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        scheduler.register(Phase::Update, recorder("b", &log)).unwrap();
        scheduler.register(Phase::Update, recorder("c", &log)).unwrap();
        scheduler.register_front(Phase::Update, recorder("a", &log)).unwrap();
        scheduler.arm().unwrap();

        let world = World::new();
        scheduler.run_sequential(Phase::Update, &world).unwrap();
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.system_names(Phase::Update), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_phase_is_noop() {
        let mut scheduler = Scheduler::new();
        scheduler.arm().unwrap();
        let world = World::new();
        scheduler.run_sequential(Phase::Render, &world).unwrap();
        scheduler.run_parallel(Phase::Render, &world).unwrap();
        assert!(scheduler.batches(Phase::Render).is_empty());
    }

    #[test]
    fn test_batches_split_conflicts() {
        let mut scheduler = Scheduler::new();
        let noop = |_: &World| {};
        scheduler
            .register(Phase::Update, FnSystem::new("move", noop).writes::<Position>().reads::<Velocity>())
            .unwrap();
        scheduler
            .register(Phase::Update, FnSystem::new("render", noop).reads::<Position>())
            .unwrap();
        scheduler
            .register(Phase::Update, FnSystem::new("damp", noop).writes::<Velocity>())
            .unwrap();
        scheduler
            .register(Phase::Update, FnSystem::new("log", noop))
            .unwrap();
        scheduler.arm().unwrap();

        assert_eq!(
            scheduler.batches(Phase::Update),
            vec![vec!["move", "log"], vec!["render", "damp"]]
        );
    }

    #[test]
    fn test_reject_policy() {
        let config = SchedulerConfig {
            conflict_policy: ConflictPolicy::Reject,
            parallel_phases: vec![Phase::Update],
            ..SchedulerConfig::default()
        };
        let noop = |_: &World| {};

        // Conflicts outside parallel phases are allowed.
        let mut scheduler = Scheduler::with_config(config.clone());
        scheduler
            .register(Phase::PostUpdate, FnSystem::new("a", noop).writes::<Position>())
            .unwrap();
        scheduler
            .register(Phase::PostUpdate, FnSystem::new("b", noop).writes::<Position>())
            .unwrap();
        scheduler.arm().unwrap();

        let mut scheduler = Scheduler::with_config(config);
        scheduler
            .register(Phase::Update, FnSystem::new("a", noop).writes::<Position>())
            .unwrap();
        scheduler
            .register(Phase::Update, FnSystem::new("b", noop).reads::<Position>())
            .unwrap();
        let err = scheduler.arm().unwrap_err();
        assert!(matches!(err, ScheduleError::AccessConflict { phase: Phase::Update, .. }));
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_parallel_runs_every_system() {
        let mut scheduler = Scheduler::with_config(SchedulerConfig {
            worker_threads: 4,
            ..SchedulerConfig::default()
        });
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["a", "b", "c", "d"] {
            scheduler.register(Phase::Update, recorder(name, &log)).unwrap();
        }
        scheduler.arm().unwrap();

        let world = World::new();
        scheduler.run_parallel(Phase::Update, &world).unwrap();
        let mut seen = log.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }
}
