use std::future::Future;
use std::io::Write;
use std::pin::pin;
use futures::future::{self, Either};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use crate::address::{self, NormalizedAddress};
use crate::food::{FoodRequest, FoodRequestClient, FoodRequestList};
use crate::geocode::GeocodeClient;
use crate::view::{self, MapEvent, MapProps, ViewSnapshot, ViewState};

/// Result of one of the startup operations.
#[derive(Debug)]
pub enum Completion {
    Address(NormalizedAddress),
    /// Failures are carried along so the list decides what to keep.
    FoodRequests(color_eyre::Result<Vec<FoodRequest>>),
}

/// Handed to background work; resolves once the owning session is gone.
#[derive(Clone)]
pub struct LifetimeToken {
    rx: watch::Receiver<()>,
}

impl LifetimeToken {
    pub async fn cancelled(mut self) {
        while self.rx.changed().await.is_ok() {}
    }

    /// Run `fut` unless the session ends first.
    pub async fn guard<T>(self, fut: impl Future<Output = T>) -> Option<T> {
        let cancelled = pin!(self.cancelled());
        let fut = pin!(fut);
        match future::select(cancelled, fut).await {
            Either::Left(_) => None,
            Either::Right((value, _)) => Some(value),
        }
    }
}

/// Lifecycle of the map view: owns its state and the work issued on its behalf.
pub struct MapSession {
    props: MapProps,
    state: ViewState,
    lifetime: watch::Sender<()>,
}

impl MapSession {
    pub fn new(props: MapProps) -> Self {
        let state = ViewState::new(&props);
        let (lifetime, _) = watch::channel(());
        Self { props, state, lifetime }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn token(&self) -> LifetimeToken {
        LifetimeToken { rx: self.lifetime.subscribe() }
    }

    /// Issue reverse geocoding and the food-request fetch.
    ///
    /// Both run independently; their results arrive on the returned channel in
    /// completion order. A failed geocode is logged and produces nothing; a
    /// failed fetch is delivered and settled by [`FoodRequestList::settle`].
    pub fn start(&self, geocoder: GeocodeClient, fetcher: FoodRequestClient) -> mpsc::UnboundedReceiver<Completion> {
        let (tx, rx) = mpsc::unbounded_channel();

        match self.props.center {
            Some(center) => {
                let token = self.token();
                let tx = tx.clone();
                tokio::spawn(async move {
                    match token.guard(geocoder.reverse_geocode(center)).await {
                        Some(Ok(result)) => {
                            let _ = tx.send(Completion::Address(address::resolve(&result)));
                        }
                        Some(Err(e)) => error!("geocode error: {:?}", e),
                        None => debug!("session ended before geocoding finished"),
                    }
                });
            }
            None => warn!("no map center yet, skip reverse geocoding"),
        }

        let token = self.token();
        tokio::spawn(async move {
            match token.guard(fetcher.fetch()).await {
                Some(fetched) => {
                    let _ = tx.send(Completion::FoodRequests(fetched));
                }
                None => debug!("session ended before food requests arrived"),
            }
        });

        rx
    }

    /// Apply a completion, returning whether the view needs a redraw.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let prev = ViewSnapshot::capture(&self.props, &self.state);
        match completion {
            Completion::Address(address) => self.state.address = address,
            Completion::FoodRequests(fetched) => {
                self.state.food_requests.settle(fetched);
            }
        }
        let next = ViewSnapshot::capture(&self.props, &self.state);
        view::should_render(&prev, &next)
    }

    /// Replace the props, returning whether the view needs a redraw.
    pub fn set_props(&mut self, props: MapProps) -> bool {
        let prev = ViewSnapshot::capture(&self.props, &self.state);
        let next = ViewSnapshot::capture(&props, &self.state);
        self.props = props;
        view::should_render(&prev, &next)
    }

    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::InfoWindowClosed => debug!("info window closed"),
        }
    }

    pub fn render(&self, out: &mut impl Write) -> std::io::Result<()> {
        view::render(&self.props, &self.state, out)
    }

    /// Draw once, then redraw as completions arrive until all work is done.
    pub async fn run(
        &mut self,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        self.render(out)?;
        while let Some(completion) = completions.recv().await {
            if self.apply(completion) {
                self.render(out)?;
            } else {
                debug!("inputs unchanged, skip render");
            }
        }
        info!("all startup work finished");
        Ok(())
    }

    /// End the session; anything still in flight is discarded.
    pub fn teardown(self) -> FoodRequestList {
        self.state.food_requests
    }
}
