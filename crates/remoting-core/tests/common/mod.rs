//! Instrumented collaborators shared by the integration tests
//!
//! Every fake writes to a shared [`Journal`] so tests can check what happened
//! and in which order, and counts disposals so tests can check that each
//! resource was released exactly once.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use remoting_core::events::{SessionEventHandler, SessionState};
use remoting_core::{
    Capability, ClientEndpoint, EndpointContainer, EndpointFactory, IdentityError,
    IdentityProvider, SessionFactory, SessionFactoryBuilder, SessionId, SignalState,
    SignalStateCell, SignalStrategy, SignalStrategyFactory, SignalingError, UserInfo,
};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TokenRequested,
    UserInfoRequested,
    StrategyCreated(usize),
    Connect { strategy: usize, username: String, token: String },
    Signal { strategy: usize, state: SignalState },
    StrategyDisposed(usize),
    EndpointCreated { endpoint: usize, capabilities: Vec<Capability> },
    InitializeStarted(usize),
    Loaded { endpoint: usize, loaded: bool },
    VersionChecked(usize),
    EndpointDisposed(usize),
}

#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(Instant, Event)>>>,
}

impl Journal {
    pub fn record(&self, event: Event) {
        self.entries.lock().push((Instant::now(), event));
    }

    pub fn events(&self) -> Vec<Event> {
        self.entries.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn timestamped(&self) -> Vec<(Instant, Event)> {
        self.entries.lock().clone()
    }

    /// Timestamp and position of the first event matching `pred`
    pub fn first(&self, pred: impl Fn(&Event) -> bool) -> Option<(usize, Instant)> {
        self.entries
            .lock()
            .iter()
            .enumerate()
            .find(|(_, (_, e))| pred(e))
            .map(|(i, (t, _))| (i, *t))
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.entries.lock().iter().filter(|(_, e)| pred(e)).count()
    }
}

#[derive(Debug)]
pub struct TestContainer(pub String);

impl EndpointContainer for TestContainer {
    fn id(&self) -> &str {
        &self.0
    }
}

// ===== IDENTITY =====

pub struct FakeIdentity {
    pub token: Result<String, IdentityError>,
    pub user: Result<UserInfo, IdentityError>,
    pub journal: Journal,
}

impl FakeIdentity {
    pub fn signed_in(journal: Journal) -> Self {
        Self {
            token: Ok("oauth-token".to_string()),
            user: Ok(UserInfo {
                email: "alice@example.com".to_string(),
                name: "Alice".to_string(),
            }),
            journal,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_token(&self) -> Result<String, IdentityError> {
        self.journal.record(Event::TokenRequested);
        tokio::task::yield_now().await;
        self.token.clone()
    }

    async fn get_user_info(&self) -> Result<UserInfo, IdentityError> {
        self.journal.record(Event::UserInfoRequested);
        tokio::task::yield_now().await;
        self.user.clone()
    }
}

// ===== SIGNALING =====

/// What a scripted strategy does once `connect` is called
#[derive(Debug, Clone)]
pub enum SignalPlan {
    Connect { delay: Duration },
    Fail { delay: Duration, error: SignalingError },
    /// Stay in `Connecting` forever
    Hang,
}

impl SignalPlan {
    pub fn connect() -> Self {
        SignalPlan::Connect { delay: Duration::from_millis(5) }
    }

    pub fn fail(error: SignalingError) -> Self {
        SignalPlan::Fail { delay: Duration::from_millis(5), error }
    }
}

pub struct ScriptedStrategy {
    id: usize,
    cell: Arc<SignalStateCell>,
    plan: SignalPlan,
    journal: Journal,
    dispose_calls: Arc<AtomicUsize>,
}

impl SignalStrategy for ScriptedStrategy {
    fn watch_state(&self) -> watch::Receiver<SignalState> {
        self.cell.subscribe()
    }

    fn connect(&self, _server: &str, username: &str, auth_token: &str) {
        self.journal.record(Event::Connect {
            strategy: self.id,
            username: username.to_string(),
            token: auth_token.to_string(),
        });

        let id = self.id;
        let cell = self.cell.clone();
        let plan = self.plan.clone();
        let journal = self.journal.clone();
        tokio::spawn(async move {
            if cell.transition(SignalState::Connecting) {
                journal.record(Event::Signal { strategy: id, state: SignalState::Connecting });
            }
            match plan {
                SignalPlan::Connect { delay } => {
                    tokio::time::sleep(delay).await;
                    // Record before publishing so the journal orders it ahead
                    // of anything the pipeline does in response.
                    if cell.current() == SignalState::Connecting {
                        journal.record(Event::Signal { strategy: id, state: SignalState::Connected });
                        cell.transition(SignalState::Connected);
                    }
                }
                SignalPlan::Fail { delay, error } => {
                    tokio::time::sleep(delay).await;
                    if !cell.current().is_terminal() {
                        journal.record(Event::Signal { strategy: id, state: SignalState::Failed });
                        cell.fail(error);
                    }
                }
                SignalPlan::Hang => {}
            }
        });
    }

    fn error(&self) -> Option<SignalingError> {
        self.cell.error()
    }

    fn dispose(&self) {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
        if self.cell.dispose() {
            self.journal.record(Event::StrategyDisposed(self.id));
        }
    }
}

/// Hands out strategies following a queue of plans, then `default_plan`
pub struct ScriptedSignaling {
    plans: Mutex<VecDeque<SignalPlan>>,
    default_plan: SignalPlan,
    journal: Journal,
    created: AtomicUsize,
    dispose_slots: Mutex<Vec<Arc<AtomicUsize>>>,
    cells: Mutex<Vec<Arc<SignalStateCell>>>,
}

impl ScriptedSignaling {
    pub fn new(journal: Journal, plans: Vec<SignalPlan>) -> Self {
        Self {
            plans: Mutex::new(plans.into()),
            default_plan: SignalPlan::connect(),
            journal,
            created: AtomicUsize::new(0),
            dispose_slots: Mutex::new(Vec::new()),
            cells: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Raw `dispose()` call count for the strategy created `index`-th
    pub fn dispose_count(&self, index: usize) -> usize {
        self.dispose_slots.lock()[index].load(Ordering::SeqCst)
    }

    pub fn total_dispose_calls(&self) -> usize {
        self.dispose_slots
            .lock()
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    pub fn state_of(&self, index: usize) -> SignalState {
        self.cells.lock()[index].current()
    }
}

impl SignalStrategyFactory for ScriptedSignaling {
    fn create_strategy(&self) -> Box<dyn SignalStrategy> {
        let id = self.created.fetch_add(1, Ordering::SeqCst);
        let plan = self
            .plans
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_plan.clone());
        let dispose_calls = Arc::new(AtomicUsize::new(0));
        let cell = Arc::new(SignalStateCell::new());
        self.dispose_slots.lock().push(dispose_calls.clone());
        self.cells.lock().push(cell.clone());
        self.journal.record(Event::StrategyCreated(id));

        Box::new(ScriptedStrategy {
            id,
            cell,
            plan,
            journal: self.journal.clone(),
            dispose_calls,
        })
    }
}

// ===== ENDPOINT =====

#[derive(Debug, Clone, Copy)]
pub struct EndpointPlan {
    pub loaded: bool,
    pub supported: bool,
    /// Never complete initialization
    pub hang: bool,
}

impl EndpointPlan {
    pub fn ready() -> Self {
        Self { loaded: true, supported: true, hang: false }
    }

    pub fn not_loaded() -> Self {
        Self { loaded: false, supported: true, hang: false }
    }

    pub fn bad_version() -> Self {
        Self { loaded: true, supported: false, hang: false }
    }

    pub fn hanging() -> Self {
        Self { loaded: true, supported: true, hang: true }
    }
}

pub struct ScriptedEndpoint {
    id: usize,
    plan: EndpointPlan,
    capabilities: Vec<Capability>,
    journal: Journal,
    dispose_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ClientEndpoint for ScriptedEndpoint {
    async fn initialize(&self) -> bool {
        self.journal.record(Event::InitializeStarted(self.id));
        if self.plan.hang {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.journal.record(Event::Loaded { endpoint: self.id, loaded: self.plan.loaded });
        self.plan.loaded
    }

    fn is_supported_version(&self) -> bool {
        self.journal.record(Event::VersionChecked(self.id));
        self.plan.supported
    }

    fn has_feature(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    fn dispose(&self) {
        if self.dispose_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.journal.record(Event::EndpointDisposed(self.id));
        }
    }
}

pub struct ScriptedEndpoints {
    plans: Mutex<VecDeque<EndpointPlan>>,
    journal: Journal,
    created: AtomicUsize,
    dispose_slots: Mutex<Vec<Arc<AtomicUsize>>>,
}

impl ScriptedEndpoints {
    pub fn new(journal: Journal, plans: Vec<EndpointPlan>) -> Self {
        Self {
            plans: Mutex::new(plans.into()),
            journal,
            created: AtomicUsize::new(0),
            dispose_slots: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn dispose_count(&self, index: usize) -> usize {
        self.dispose_slots.lock()[index].load(Ordering::SeqCst)
    }

    pub fn total_dispose_calls(&self) -> usize {
        self.dispose_slots
            .lock()
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }
}

impl EndpointFactory for ScriptedEndpoints {
    fn create_endpoint(
        &self,
        _container: &dyn EndpointContainer,
        capabilities: &[Capability],
    ) -> Box<dyn ClientEndpoint> {
        let id = self.created.fetch_add(1, Ordering::SeqCst);
        let plan = self.plans.lock().pop_front().unwrap_or_else(EndpointPlan::ready);
        let dispose_calls = Arc::new(AtomicUsize::new(0));
        self.dispose_slots.lock().push(dispose_calls.clone());
        self.journal.record(Event::EndpointCreated {
            endpoint: id,
            capabilities: capabilities.to_vec(),
        });

        Box::new(ScriptedEndpoint {
            id,
            plan,
            capabilities: capabilities.to_vec(),
            journal: self.journal.clone(),
            dispose_calls,
        })
    }
}

// ===== LISTENER =====

#[derive(Default)]
pub struct RecordingListener {
    pub changes: Mutex<Vec<(SessionId, SessionState, SessionState)>>,
}

#[async_trait]
impl SessionEventHandler for RecordingListener {
    async fn on_session_state_changed(
        &self,
        session_id: SessionId,
        old_state: SessionState,
        new_state: SessionState,
    ) {
        self.changes.lock().push((session_id, old_state, new_state));
    }
}

// ===== HARNESS =====

pub struct Harness {
    pub journal: Journal,
    pub signaling: Arc<ScriptedSignaling>,
    pub endpoints: Arc<ScriptedEndpoints>,
    pub factory: SessionFactory,
}

impl Harness {
    pub fn new(signal_plans: Vec<SignalPlan>, endpoint_plans: Vec<EndpointPlan>) -> Self {
        let journal = Journal::default();
        Self::with_identity(
            FakeIdentity::signed_in(journal.clone()),
            journal,
            signal_plans,
            endpoint_plans,
        )
    }

    pub fn with_identity(
        identity: FakeIdentity,
        journal: Journal,
        signal_plans: Vec<SignalPlan>,
        endpoint_plans: Vec<EndpointPlan>,
    ) -> Self {
        let signaling = Arc::new(ScriptedSignaling::new(journal.clone(), signal_plans));
        let endpoints = Arc::new(ScriptedEndpoints::new(journal.clone(), endpoint_plans));
        let factory = SessionFactoryBuilder::new()
            .container(Arc::new(TestContainer("viewer".to_string())))
            .identity_provider(Arc::new(identity))
            .signal_strategy_factory(signaling.clone())
            .endpoint_factory(endpoints.clone())
            .signaling_server("xmpp.example.com:5222")
            .app_capabilities(vec![Capability::Cast])
            .build()
            .expect("harness factory");

        Self {
            journal,
            signaling,
            endpoints,
            factory,
        }
    }
}
