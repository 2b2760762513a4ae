use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::events::SketchEvent;
use crate::program::{ColorProgram, LoadError, LoadFuture, ProgramHost, SurfaceError};
use crate::registry::SketchRegistry;
use crate::route::RouteResolver;

/// Where the manager is in the load/install cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing has been installed yet.
    Idle,
    /// A load for `target` is in flight. `active` is the sketch that keeps
    /// rendering meanwhile.
    Loading {
        target: String,
        generation: u64,
        active: Option<String>,
    },
    Active { id: String },
    Disposed,
}

impl LifecycleState {
    fn settled(active: Option<String>) -> Self {
        match active {
            Some(id) => LifecycleState::Active { id },
            None => LifecycleState::Idle,
        }
    }
}

/// Identifies one accepted navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: String,
    pub generation: u64,
}

/// A started load. Await `future` and hand the result back through
/// [`SketchLifecycleManager::complete`] together with `ticket`.
pub struct PendingLoad<P> {
    pub ticket: LoadTicket,
    pub future: LoadFuture<P>,
}

/// Outcome of [`SketchLifecycleManager::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Installed { id: String },
    /// Superseded by a newer navigation (or the manager was disposed).
    Discarded { id: String },
    Failed { id: String },
}

/// Switches the program bound to a [`ProgramHost`] in response to routes.
///
/// Every accepted navigation gets a fresh generation number. A load may only
/// install its program if its generation is still the pending one when it
/// completes, so the last navigation always wins regardless of the order in
/// which loads finish.
pub struct SketchLifecycleManager<P> {
    registry: SketchRegistry<P>,
    resolver: RouteResolver,
    state: LifecycleState,
    generation: u64,
    events_tx: Sender<SketchEvent>,
    events_rx: Receiver<SketchEvent>,
}

impl<P: ColorProgram> SketchLifecycleManager<P> {
    pub fn new(registry: SketchRegistry<P>, resolver: RouteResolver) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            registry,
            resolver,
            state: LifecycleState::Idle,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn registry(&self) -> &SketchRegistry<P> {
        &self.registry
    }

    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }

    /// Receiver for lifecycle notifications. Every clone sees each event
    /// once across all clones.
    pub fn events(&self) -> Receiver<SketchEvent> {
        self.events_rx.clone()
    }

    /// The sketch currently rendering, including while another one loads.
    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            LifecycleState::Active { id } => Some(id),
            LifecycleState::Loading { active, .. } => active.as_deref(),
            LifecycleState::Idle | LifecycleState::Disposed => None,
        }
    }

    /// The in-flight target, if a load is pending.
    pub fn pending(&self) -> Option<&str> {
        match &self.state {
            LifecycleState::Loading { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Resolves `path` and starts loading the matching sketch.
    ///
    /// Returns `None` when the route does not name a registered sketch; the
    /// state is left untouched and [`SketchEvent::NotFound`] is published.
    pub fn begin(&mut self, path: &str) -> Option<PendingLoad<P>> {
        if self.state == LifecycleState::Disposed {
            warn!(route = path, "navigation after lifecycle manager disposal ignored");
            return None;
        }

        let registry = &self.registry;
        let id = self.resolver.resolve(path, |candidate| registry.contains(candidate));
        let future = match registry.resolve(&id) {
            Ok(descriptor) => descriptor.load(),
            Err(err) => {
                warn!(route = path, sketch = %id, "{err}; keeping current sketch");
                self.emit(SketchEvent::NotFound {
                    route: path.to_string(),
                    id,
                });
                return None;
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let active = self.active_id().map(str::to_string);
        if let LifecycleState::Loading { target, .. } = &self.state {
            debug!(superseded = %target, sketch = %id, "newer navigation supersedes pending load");
        }
        info!(sketch = %id, generation, "loading sketch");
        self.state = LifecycleState::Loading {
            target: id.clone(),
            generation,
            active,
        };
        self.emit(SketchEvent::Loading {
            id: id.clone(),
            generation,
        });

        Some(PendingLoad {
            ticket: LoadTicket { id, generation },
            future,
        })
    }

    /// Finishes a load started by [`SketchLifecycleManager::begin`].
    ///
    /// Stale results are disposed without touching `host`. A current success
    /// disposes the outgoing program before the new one is installed. A
    /// current failure leaves the outgoing program bound.
    pub fn complete<H>(
        &mut self,
        ticket: LoadTicket,
        result: Result<P, LoadError>,
        host: &mut H,
    ) -> Result<Completion, SurfaceError>
    where
        H: ProgramHost<P> + ?Sized,
    {
        let LoadTicket { id, generation } = ticket;

        if self.state == LifecycleState::Disposed {
            if let Ok(program) = result {
                debug!(sketch = %id, "disposing program loaded after manager teardown");
                program.dispose();
            }
            return Ok(Completion::Discarded { id });
        }

        let previous = match &self.state {
            LifecycleState::Loading {
                generation: pending,
                active,
                ..
            } if *pending == generation => Some(active.clone()),
            _ => None,
        };

        let Some(previous) = previous else {
            match result {
                Ok(program) => {
                    debug!(sketch = %id, generation, "discarding stale program");
                    program.dispose();
                    self.emit(SketchEvent::StaleDiscarded { id: id.clone() });
                }
                Err(err) => {
                    debug!(sketch = %id, generation, error = %err, "stale load failed");
                }
            }
            return Ok(Completion::Discarded { id });
        };

        let program = match result {
            Ok(program) => program,
            Err(err) => {
                warn!(sketch = %id, error = %err, "sketch failed to load; keeping current sketch");
                self.emit(SketchEvent::LoadFailed {
                    id: id.clone(),
                    cause: err.to_string(),
                });
                self.state = LifecycleState::settled(previous);
                return Ok(Completion::Failed { id });
            }
        };

        let outgoing = match host.take_active_program() {
            Ok(outgoing) => outgoing,
            Err(err) => {
                error!(sketch = %id, error = %err, "cannot swap sketch");
                program.dispose();
                self.state = LifecycleState::settled(previous);
                return Err(err);
            }
        };
        if let Some(outgoing) = outgoing {
            debug!(program = outgoing.label(), "disposing outgoing program");
            outgoing.dispose();
        }

        if let Err(err) = host.set_active_program(program) {
            error!(sketch = %id, error = %err, "failed to install sketch");
            self.state = LifecycleState::Idle;
            return Err(err);
        }

        info!(sketch = %id, generation, "sketch active");
        self.state = LifecycleState::Active { id: id.clone() };
        self.emit(SketchEvent::Activated { id: id.clone() });
        Ok(Completion::Installed { id })
    }

    /// `begin`, block on the loader, then `complete`.
    pub fn navigate_blocking<H>(
        &mut self,
        path: &str,
        host: &mut H,
    ) -> Result<Option<Completion>, SurfaceError>
    where
        H: ProgramHost<P> + ?Sized,
    {
        let Some(PendingLoad { ticket, future }) = self.begin(path) else {
            return Ok(None);
        };
        let result = pollster::block_on(future);
        self.complete(ticket, result, host).map(Some)
    }

    /// Disposes the host's program and stops accepting navigations.
    /// Calling it again is a no-op.
    pub fn dispose<H>(&mut self, host: &mut H)
    where
        H: ProgramHost<P> + ?Sized,
    {
        if self.state == LifecycleState::Disposed {
            return;
        }
        match host.take_active_program() {
            Ok(Some(program)) => {
                debug!(program = program.label(), "disposing active program");
                program.dispose();
            }
            Ok(None) => {}
            Err(SurfaceError::UseAfterDispose) => {
                debug!("host already disposed; nothing to release");
            }
            Err(err) => {
                warn!(error = %err, "failed to detach active program during teardown");
            }
        }
        self.state = LifecycleState::Disposed;
    }

    fn emit(&self, event: SketchEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("lifecycle event channel closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct TestProgram {
        label: String,
        log: Log,
    }

    impl ColorProgram for TestProgram {
        fn label(&self) -> &str {
            &self.label
        }

        fn dispose(self) {
            self.log.borrow_mut().push(format!("dispose:{}", self.label));
        }
    }

    #[derive(Default)]
    struct TestHost {
        active: Option<TestProgram>,
        disposed: bool,
        installs: Vec<String>,
    }

    impl ProgramHost<TestProgram> for TestHost {
        fn set_active_program(&mut self, program: TestProgram) -> Result<(), SurfaceError> {
            if self.disposed {
                program.dispose();
                return Err(SurfaceError::UseAfterDispose);
            }
            self.installs.push(program.label.clone());
            self.active = Some(program);
            Ok(())
        }

        fn take_active_program(&mut self) -> Result<Option<TestProgram>, SurfaceError> {
            if self.disposed {
                return Err(SurfaceError::UseAfterDispose);
            }
            Ok(self.active.take())
        }

        fn active_label(&self) -> Option<&str> {
            self.active.as_ref().map(|program| program.label.as_str())
        }
    }

    fn ok_loader(label: &'static str, log: &Log) -> impl Fn() -> LoadFuture<TestProgram> {
        let log = log.clone();
        move || -> LoadFuture<TestProgram> {
            let program = TestProgram {
                label: label.to_string(),
                log: log.clone(),
            };
            Box::pin(async move { Ok::<_, LoadError>(program) })
        }
    }

    fn failing_loader() -> impl Fn() -> LoadFuture<TestProgram> {
        || -> LoadFuture<TestProgram> {
            Box::pin(async { Err::<TestProgram, _>(LoadError::Compile("syntax error".into())) })
        }
    }

    fn manager(log: &Log) -> SketchLifecycleManager<TestProgram> {
        let mut registry = SketchRegistry::new();
        registry.register("a", "A", ok_loader("a", log)).unwrap();
        registry.register("b", "B", failing_loader()).unwrap();
        registry.register("c", "C", ok_loader("c", log)).unwrap();
        registry
            .register("flare-1", "Flare", ok_loader("flare-1", log))
            .unwrap();
        SketchLifecycleManager::new(registry, RouteResolver::with_default("flare-1"))
    }

    fn drain(manager: &SketchLifecycleManager<TestProgram>) -> Vec<SketchEvent> {
        manager.events().try_iter().collect()
    }

    #[test]
    fn scenario_not_found_and_failed_load_keep_active_sketch() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();

        let completion = manager.navigate_blocking("/sketches/a", &mut host).unwrap();
        assert_eq!(completion, Some(Completion::Installed { id: "a".into() }));
        assert_eq!(manager.state(), &LifecycleState::Active { id: "a".into() });
        assert_eq!(host.active_label(), Some("a"));
        drain(&manager);

        let completion = manager
            .navigate_blocking("/sketches/missing", &mut host)
            .unwrap();
        assert_eq!(completion, None);
        assert_eq!(manager.state(), &LifecycleState::Active { id: "a".into() });
        assert_eq!(
            drain(&manager),
            vec![SketchEvent::NotFound {
                route: "/sketches/missing".into(),
                id: "missing".into(),
            }]
        );

        let completion = manager.navigate_blocking("/sketches/b", &mut host).unwrap();
        assert_eq!(completion, Some(Completion::Failed { id: "b".into() }));
        assert_eq!(manager.state(), &LifecycleState::Active { id: "a".into() });
        assert_eq!(host.active_label(), Some("a"));
        let events = drain(&manager);
        assert!(events.iter().any(|event| matches!(
            event,
            SketchEvent::LoadFailed { id, cause } if id == "b" && cause.contains("syntax error")
        )));
        assert!(log.borrow().is_empty(), "program a must not be disposed");
    }

    #[test]
    fn last_navigation_wins_when_loads_finish_out_of_order() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();

        let slow = manager.begin("/sketches/a").expect("a registered");
        let fast = manager.begin("/sketches/c").expect("c registered");
        assert_eq!(manager.pending(), Some("c"));

        let fast_result = pollster::block_on(fast.future);
        let completion = manager.complete(fast.ticket, fast_result, &mut host).unwrap();
        assert_eq!(completion, Completion::Installed { id: "c".into() });

        let slow_result = pollster::block_on(slow.future);
        let completion = manager.complete(slow.ticket, slow_result, &mut host).unwrap();
        assert_eq!(completion, Completion::Discarded { id: "a".into() });

        assert_eq!(manager.state(), &LifecycleState::Active { id: "c".into() });
        assert_eq!(host.installs, vec!["c".to_string()]);
        assert_eq!(host.active_label(), Some("c"));
        assert_eq!(*log.borrow(), vec!["dispose:a".to_string()]);
        assert!(drain(&manager).contains(&SketchEvent::StaleDiscarded { id: "a".into() }));
    }

    #[test]
    fn superseded_load_is_discarded_even_if_it_finishes_first() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();

        let first = manager.begin("/sketches/a").unwrap();
        let second = manager.begin("/sketches/c").unwrap();

        let first_result = pollster::block_on(first.future);
        assert_eq!(
            manager.complete(first.ticket, first_result, &mut host).unwrap(),
            Completion::Discarded { id: "a".into() }
        );
        assert!(host.active.is_none());
        assert_eq!(manager.pending(), Some("c"));

        let second_result = pollster::block_on(second.future);
        assert_eq!(
            manager.complete(second.ticket, second_result, &mut host).unwrap(),
            Completion::Installed { id: "c".into() }
        );
        assert_eq!(host.installs, vec!["c".to_string()]);
    }

    #[test]
    fn same_id_navigated_twice_installs_only_latest_generation() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();

        let older = manager.begin("/sketches/a").unwrap();
        let _middle = manager.begin("/sketches/c").unwrap();
        let newest = manager.begin("/sketches/a").unwrap();
        assert!(newest.ticket.generation > older.ticket.generation);

        let older_result = pollster::block_on(older.future);
        assert_eq!(
            manager.complete(older.ticket, older_result, &mut host).unwrap(),
            Completion::Discarded { id: "a".into() }
        );
        let newest_result = pollster::block_on(newest.future);
        assert_eq!(
            manager.complete(newest.ticket, newest_result, &mut host).unwrap(),
            Completion::Installed { id: "a".into() }
        );
    }

    #[test]
    fn exactly_one_program_bound_after_first_success() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();
        let routes = [
            "/",
            "/sketches/a",
            "/sketches/b",
            "/sketches/missing",
            "/c",
            "/sketches/b",
            "/sketches/a/",
        ];

        for route in routes {
            manager.navigate_blocking(route, &mut host).unwrap();
            assert!(host.active.is_some(), "no program bound after {route}");
            assert_eq!(manager.active_id(), host.active_label());
        }

        let installs = host.installs.len();
        let disposals = log.borrow().len();
        assert_eq!(installs, disposals + 1, "every replaced program is disposed");
    }

    #[test]
    fn outgoing_program_is_disposed_before_replacement_is_installed() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();

        manager.navigate_blocking("/", &mut host).unwrap();
        manager.navigate_blocking("/sketches/a", &mut host).unwrap();

        assert_eq!(*log.borrow(), vec!["dispose:flare-1".to_string()]);
        assert_eq!(host.installs, vec!["flare-1".to_string(), "a".to_string()]);
    }

    #[test]
    fn failed_first_load_returns_to_idle() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();

        let completion = manager.navigate_blocking("/sketches/b", &mut host).unwrap();
        assert_eq!(completion, Some(Completion::Failed { id: "b".into() }));
        assert_eq!(manager.state(), &LifecycleState::Idle);
        assert!(host.active.is_none());
    }

    #[test]
    fn loading_state_remembers_active_sketch() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();
        manager.navigate_blocking("/sketches/a", &mut host).unwrap();

        let pending = manager.begin("/sketches/c").unwrap();
        assert_eq!(
            manager.state(),
            &LifecycleState::Loading {
                target: "c".into(),
                generation: pending.ticket.generation,
                active: Some("a".into()),
            }
        );
        assert_eq!(manager.active_id(), Some("a"));
    }

    #[test]
    fn dispose_releases_program_and_rejects_further_navigation() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost::default();
        manager.navigate_blocking("/sketches/a", &mut host).unwrap();

        let late = manager.begin("/sketches/c").unwrap();
        manager.dispose(&mut host);
        manager.dispose(&mut host);
        assert_eq!(manager.state(), &LifecycleState::Disposed);
        assert!(host.active.is_none());

        let late_result = pollster::block_on(late.future);
        assert_eq!(
            manager.complete(late.ticket, late_result, &mut host).unwrap(),
            Completion::Discarded { id: "c".into() }
        );
        assert_eq!(
            *log.borrow(),
            vec!["dispose:a".to_string(), "dispose:c".to_string()]
        );
        assert!(manager.begin("/sketches/a").is_none());
    }

    #[test]
    fn install_into_disposed_host_surfaces_error() {
        let log = Log::default();
        let mut manager = manager(&log);
        let mut host = TestHost {
            disposed: true,
            ..TestHost::default()
        };

        let err = manager
            .navigate_blocking("/sketches/a", &mut host)
            .unwrap_err();
        assert!(matches!(err, SurfaceError::UseAfterDispose));
        assert_eq!(*log.borrow(), vec!["dispose:a".to_string()]);
        assert_eq!(manager.state(), &LifecycleState::Idle);
    }
}
